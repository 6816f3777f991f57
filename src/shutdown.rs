//! Stop a running sync between links.
//!
//! The first SIGINT, SIGTERM or SIGHUP trips the returned token: the engine
//! lets the link being published finish, writes its progress, and returns.
//! Another signal after that exits straight away with status 130.

use tokio_util::sync::CancellationToken;

/// Signal streams registered up front so a failure surfaces before the sync
/// starts rather than inside the watcher task.
struct StopSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl StopSignals {
    fn register() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
                hangup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next stop signal. `false` once signals can no longer be
    /// received.
    async fn next(&mut self) -> bool {
        #[cfg(unix)]
        {
            tokio::select! {
                r = tokio::signal::ctrl_c() => r.is_ok(),
                r = self.terminate.recv() => r.is_some(),
                r = self.hangup.recv() => r.is_some(),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.is_ok()
        }
    }
}

fn request_stop(token: &CancellationToken) {
    tracing::info!("Stopping after the current link, signal again to quit immediately");
    token.cancel();
}

/// Start watching for stop signals and return the token they cancel.
pub(crate) fn install_signal_handler() -> std::io::Result<CancellationToken> {
    let mut signals = StopSignals::register()?;
    let token = CancellationToken::new();
    let stop = token.clone();

    tokio::spawn(async move {
        if !signals.next().await {
            return;
        }
        request_stop(&stop);

        if signals.next().await {
            tracing::warn!("Quitting without saving the remaining progress");
            std::process::exit(130);
        }
    });

    Ok(token)
}
