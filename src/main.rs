//! goodlinks2insta: mirror GoodLinks saved links into Instapaper.
//!
//! Links are read from the GoodLinks app via AppleScript, diffed against a
//! local record of what has already been sent, and added to Instapaper one at
//! a time through its Simple API. Transient failures are retried with
//! exponential backoff; progress is flushed periodically so re-runs are
//! idempotent.

#![warn(clippy::all)]

mod cli;
mod config;
mod goodlinks;
mod instapaper;
mod lock;
mod logging;
mod retry;
mod shutdown;
mod state;
mod sync;
mod types;

use std::io::Write;

use clap::Parser;

use cli::{Command, InitArgs, SyncArgs};
use config::{AppPaths, Config, CredentialProvider};
use goodlinks::{AppleScriptSource, GoodLinksApp, LifecycleGuard};
use instapaper::InstapaperClient;
use state::{JsonStateStore, StateStore};
use sync::{SyncEngine, SyncError, SyncOptions};

/// Pending titles listed by `status`.
const STATUS_PREVIEW_COUNT: usize = 10;
const STATUS_TITLE_WIDTH: usize = 60;

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Run the init command.
fn run_init(paths: &AppPaths, args: InitArgs) -> anyhow::Result<()> {
    let config_path = paths.config_file();
    if config_path.exists() && !args.force {
        println!("Config already exists: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("Enter your Instapaper credentials:");
    println!("  Note: Use your Instapaper email and password you use to log in");
    let username = prompt_line("  Email: ")?;
    let password = rpassword::prompt_password("  Password: ")?.trim().to_string();

    if username.is_empty() || password.is_empty() {
        anyhow::bail!(
            "Instapaper email and password are both required\n  \
             Make sure you've entered both fields and try again"
        );
    }

    Config::new(username, password).save(&config_path)?;
    println!("Config saved to {}", config_path.display());
    Ok(())
}

/// Run the sync command.
///
/// GoodLinks is launched if needed and quit again afterwards when this run
/// started it, whether or not the sync succeeded.
async fn run_sync(paths: &AppPaths, args: SyncArgs) -> anyhow::Result<()> {
    let config = Config::load(&paths.config_file())?;
    logging::init(&logging::LogOptions {
        console: !args.quiet,
        log_file: config.log_path(),
    })?;

    let _lock = lock::RunLock::acquire(&paths.lock_file())?;
    tracing::info!("Starting sync");

    let publisher = InstapaperClient::new(config.credentials()?)?;
    let source = AppleScriptSource;
    let store = JsonStateStore::new(paths.state_file());
    let app = GoodLinksApp::default();
    let shutdown_token = shutdown::install_signal_handler()?;

    let options = SyncOptions {
        dry_run: args.dry_run,
        max_retries: args.max_retries,
    };

    let mut guard = LifecycleGuard::new(&app);
    let result = match guard.ensure_ready(config.launch_goodlinks).await {
        Ok(true) => {
            SyncEngine::new(&source, &publisher, &store)
                .run(options, &shutdown_token)
                .await
        }
        Ok(false) => Err(SyncError::SourceNotReady),
        Err(e) => Err(e.into()),
    };
    guard.restore().await;

    match result {
        Ok(report) => {
            tracing::debug!(?report, "Sync finished");
            Ok(())
        }
        Err(e) => {
            // Logged rather than returned so background runs record it in the log file.
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Run the status command.
async fn run_status(paths: &AppPaths) -> anyhow::Result<()> {
    let store = JsonStateStore::new(paths.state_file());
    let status = sync::status(&AppleScriptSource, &store).await?;

    println!("GoodLinks: {} links", status.total_links);
    println!("Synced:    {}", status.synced_count);
    println!("Pending:   {}", status.pending.len());
    if let Some(saved) = store.last_saved().await? {
        println!("Last saved: {}", saved.format("%Y-%m-%d %H:%M:%S"));
    }

    if !status.pending.is_empty() {
        println!();
        println!("Pending links:");
        for link in status.pending.iter().take(STATUS_PREVIEW_COUNT) {
            println!("  - {}", link.short_title(STATUS_TITLE_WIDTH));
        }
        if status.pending.len() > STATUS_PREVIEW_COUNT {
            println!("  ... and {} more", status.pending.len() - STATUS_PREVIEW_COUNT);
        }
    }

    Ok(())
}

/// Run the reset command.
async fn run_reset(paths: &AppPaths) -> anyhow::Result<()> {
    let store = JsonStateStore::new(paths.state_file());
    if store.reset().await? {
        println!("Sync state reset");
    } else {
        println!("No sync state to reset");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let paths = AppPaths::resolve(cli.app_dir.as_deref())?;

    let command = cli.effective_command();
    // sync sets up its own logging once the config (and log file) is known
    if !matches!(command, Command::Sync(_)) {
        logging::init(&logging::LogOptions {
            console: true,
            log_file: None,
        })?;
    }

    match command {
        Command::Init(args) => run_init(&paths, args),
        Command::Sync(args) => run_sync(&paths, args).await,
        Command::Status => run_status(&paths).await,
        Command::Reset => run_reset(&paths).await,
    }
}
