//! GoodLinks process lifecycle.
//!
//! AppleScript queries need the app running. [`LifecycleGuard`] launches it
//! on demand and, if it did so, quits it again once the sync is over so a
//! background run leaves the desktop as it found it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::SourceError;

const APP_NAME: &str = "GoodLinks";

/// How long to let the app start before checking it again.
const LAUNCH_SETTLE: Duration = Duration::from_secs(2);

/// Capability to inspect and control the source application process.
#[async_trait]
pub trait AppControl: Send + Sync {
    async fn is_running(&self) -> bool;
    async fn launch(&self) -> Result<(), SourceError>;
    async fn quit(&self) -> Result<(), SourceError>;
}

/// Controls the real GoodLinks app via `pgrep`, `open`, and `osascript`.
#[derive(Debug, Clone, Default)]
pub struct GoodLinksApp;

#[async_trait]
impl AppControl for GoodLinksApp {
    async fn is_running(&self) -> bool {
        match Command::new("pgrep").args(["-x", APP_NAME]).output().await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(error = %e, "pgrep failed, assuming {} is not running", APP_NAME);
                false
            }
        }
    }

    async fn launch(&self) -> Result<(), SourceError> {
        let output = Command::new("open").args(["-a", APP_NAME]).output().await?;
        if !output.status.success() {
            return Err(SourceError::LaunchFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        tokio::time::sleep(LAUNCH_SETTLE).await;
        Ok(())
    }

    async fn quit(&self) -> Result<(), SourceError> {
        let script = format!("tell application \"{}\" to quit", APP_NAME);
        let output = Command::new("osascript").args(["-e", &script]).output().await?;
        if !output.status.success() {
            return Err(SourceError::QuitFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

/// Ensures the app is running for the duration of a sync and restores its
/// prior state afterwards.
pub struct LifecycleGuard<'a, A: AppControl + ?Sized> {
    app: &'a A,
    launched: bool,
}

impl<'a, A: AppControl + ?Sized> LifecycleGuard<'a, A> {
    pub fn new(app: &'a A) -> Self {
        Self {
            app,
            launched: false,
        }
    }

    #[cfg(test)]
    fn launched(&self) -> bool {
        self.launched
    }

    /// Returns whether the app is confirmed running, launching it first when
    /// `auto_launch` is set.
    pub async fn ensure_ready(&mut self, auto_launch: bool) -> Result<bool, SourceError> {
        if self.app.is_running().await {
            return Ok(true);
        }

        if !auto_launch {
            tracing::warn!(
                "GoodLinks is not running and launch_goodlinks is disabled in config\n\
                 Either start GoodLinks manually or set 'launch_goodlinks': true in config"
            );
            return Ok(false);
        }

        tracing::info!("Launching GoodLinks...");
        self.app.launch().await?;
        self.launched = true;

        if self.app.is_running().await {
            Ok(true)
        } else {
            tracing::error!("GoodLinks failed to start");
            Ok(false)
        }
    }

    /// Quit the app if this guard launched it. Failures are logged only.
    pub async fn restore(self) {
        if !self.launched {
            return;
        }
        tracing::info!("Closing GoodLinks");
        if let Err(e) = self.app.quit().await {
            tracing::warn!("Failed to close GoodLinks: {}", e);
        }
    }
}
