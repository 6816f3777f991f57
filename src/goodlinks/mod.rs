//! GoodLinks integration: enumerating saved links and controlling the app
//! process. Both go through `osascript`/process tools on macOS, behind traits
//! so the sync engine can be tested without the app.

pub mod app;
pub mod error;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::LinkRecord;

pub use app::{GoodLinksApp, LifecycleGuard};
pub use error::SourceError;

/// Emits one `id<TAB>url<TAB>title` line per saved link.
const LIST_LINKS_SCRIPT: &str = r#"
tell application "GoodLinks"
    set output to ""
    repeat with l in (every link)
        set output to output & (id of l) & tab & (url of l) & tab & (title of l) & linefeed
    end repeat
    return output
end tell
"#;

/// Read-only view of the user's saved links.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Fetch every saved link, in whatever order the source provides.
    async fn fetch_all(&self) -> Result<Vec<LinkRecord>, SourceError>;
}

/// Queries the running GoodLinks app via AppleScript.
#[derive(Debug, Default, Clone)]
pub struct AppleScriptSource;

#[async_trait]
impl LinkSource for AppleScriptSource {
    async fn fetch_all(&self) -> Result<Vec<LinkRecord>, SourceError> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(LIST_LINKS_SCRIPT)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::from_script_stderr(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let links = parse_links(&stdout);
        tracing::debug!(count = links.len(), "Fetched links from GoodLinks");
        Ok(links)
    }
}

/// Parse a single tab-delimited record. Extra tabs stay in the title.
pub fn parse_record(line: &str) -> Result<LinkRecord, SourceError> {
    let mut parts = line.splitn(3, '\t');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(url), Some(title)) => Ok(LinkRecord::new(id, url, title)),
        _ => Err(SourceError::Protocol {
            line: line.to_string(),
            fields: line.split('\t').count(),
        }),
    }
}

/// Parse the script output, dropping (and logging) malformed records.
pub fn parse_links(output: &str) -> Vec<LinkRecord> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_record(line) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!("Skipping record: {}", e);
                None
            }
        })
        .collect()
}
