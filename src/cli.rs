use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "goodlinks2insta", version, about = "Sync GoodLinks to Instapaper")]
pub struct Cli {
    /// Directory holding config.json and synced.json
    /// (default: ~/Library/Application Support/goodlinks2insta)
    #[arg(long, global = true, env = "GOODLINKS2INSTA_DIR")]
    pub app_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize config with credentials
    Init(InitArgs),
    /// Sync links to Instapaper
    Sync(SyncArgs),
    /// Show sync status
    Status,
    /// Reset sync state (mark all links as unsynced)
    Reset,
}

#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct InitArgs {
    /// Overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    /// Show what would be synced
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress console output (for background runs)
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum number of retries for failed requests
    #[arg(short = 'r', long, default_value_t = 3)]
    pub max_retries: u32,
}

impl Default for SyncArgs {
    fn default() -> Self {
        Self {
            dry_run: false,
            quiet: false,
            max_retries: 3,
        }
    }
}

impl Cli {
    /// The command to run; no subcommand means `sync` with defaults.
    pub fn effective_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Sync(SyncArgs::default()))
    }
}
