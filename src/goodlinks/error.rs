use thiserror::Error;

/// Failures talking to the GoodLinks app.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(
        "Cannot connect to GoodLinks - is the app installed and running?\n\
         GoodLinks must be running in the background to sync links"
    )]
    Unavailable,

    #[error("AppleScript failed: {0}")]
    ScriptFailed(String),

    /// A record line with fewer than three tab-separated fields.
    #[error("Malformed GoodLinks record ({fields} field(s)): {line:?}")]
    Protocol { line: String, fields: usize },

    #[error("Failed to launch GoodLinks: {0}")]
    LaunchFailed(String),

    #[error("Failed to quit GoodLinks: {0}")]
    QuitFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Map a failed `osascript` run to an error based on its stderr.
    pub(crate) fn from_script_stderr(stderr: &str) -> Self {
        if stderr.contains("No such process") || stderr.contains("not running") {
            Self::Unavailable
        } else {
            Self::ScriptFailed(stderr.trim().to_string())
        }
    }
}
