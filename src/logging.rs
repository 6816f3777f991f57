//! Tracing subscriber setup.
//!
//! Interactive runs get bare messages on stderr. Background runs (`sync -q`)
//! rely on the log file, which records everything down to DEBUG with local
//! timestamps.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Print to stderr.
    pub console: bool,
    /// Append to this file.
    pub log_file: Option<PathBuf>,
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level))
}

/// Build the subscriber without installing it.
pub fn subscriber(
    options: &LogOptions,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let console = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter("info")))
    });

    let file = match &options.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                    .with_filter(crate_filter("debug")),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry().with(console).with(file))
}

/// Install the global subscriber.
pub fn init(options: &LogOptions) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(subscriber(options)?)
        .context("Failed to install tracing subscriber")
}
