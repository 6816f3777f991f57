use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Directory name under the platform data dir.
pub const APP_NAME: &str = "goodlinks2insta";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STATE_FILE_NAME: &str = "synced.json";
pub const LOCK_FILE_NAME: &str = "sync.lock";
pub const DEFAULT_LOG_FILE: &str = "~/Library/Logs/goodlinks2insta.log";

/// Instapaper account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of Instapaper credentials. The plaintext config file is one
/// implementation; a keychain-backed one can stand in without the publisher
/// noticing.
pub trait CredentialProvider {
    fn credentials(&self) -> anyhow::Result<Credentials>;
}

/// Persisted application configuration (`config.json`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub username: String,
    pub password: String,
    #[serde(default = "default_launch_goodlinks")]
    pub launch_goodlinks: bool,
    #[serde(default = "default_log_file")]
    pub log_file: Option<String>,
}

fn default_launch_goodlinks() -> bool {
    true
}

fn default_log_file() -> Option<String> {
    Some(DEFAULT_LOG_FILE.to_string())
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("launch_goodlinks", &self.launch_goodlinks)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl Config {
    /// New config with defaults for everything but the credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            launch_goodlinks: default_launch_goodlinks(),
            log_file: default_log_file(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\nRun '{} init' to create it",
                path.display(),
                APP_NAME
            );
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Write the config, creating the parent directory, and restrict it to
    /// the owner since it holds the password.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    /// Resolved log file path; `None` when file logging is disabled.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_tilde)
    }
}

impl CredentialProvider for Config {
    fn credentials(&self) -> anyhow::Result<Credentials> {
        if self.username.is_empty() || self.password.is_empty() {
            anyhow::bail!(
                "Instapaper credentials are incomplete\nRun '{} init --force' to re-enter them",
                APP_NAME
            );
        }
        Ok(Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Where config, state, and the run lock live.
#[derive(Debug, Clone)]
pub struct AppPaths {
    dir: PathBuf,
}

impl AppPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `override_dir` if given, else the platform data directory
    /// (`~/Library/Application Support/goodlinks2insta` on macOS).
    pub fn resolve(override_dir: Option<&str>) -> anyhow::Result<Self> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(expand_tilde(dir)));
        }
        let base = dirs::data_dir().context("Cannot determine the application data directory")?;
        Ok(Self::new(base.join(APP_NAME)))
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.dir.join(LOCK_FILE_NAME)
    }
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde("~/Documents");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join("Documents"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_defaults_applied_when_absent() {
        let cfg: Config =
            serde_json::from_str(r#"{"username": "u@example.com", "password": "pw"}"#).unwrap();
        assert!(cfg.launch_goodlinks);
        assert_eq!(cfg.log_file.as_deref(), Some(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_null_or_empty_log_file_disables_file_logging() {
        let cfg: Config = serde_json::from_str(
            r#"{"username": "u", "password": "p", "launch_goodlinks": false, "log_file": null}"#,
        )
        .unwrap();
        assert!(!cfg.launch_goodlinks);
        assert!(cfg.log_path().is_none());

        let mut cfg = Config::new("u", "p");
        cfg.log_file = Some("  ".into());
        assert!(cfg.log_path().is_none());
    }

    #[test]
    fn test_log_path_expands_tilde() {
        let mut cfg = Config::new("u", "p");
        cfg.log_file = Some("~/Library/Logs/x.log".into());
        let home = dirs::home_dir().expect("home directory");
        assert_eq!(cfg.log_path(), Some(home.join("Library/Logs/x.log")));

        cfg.log_file = Some("/var/log/g2i.log".into());
        assert_eq!(cfg.log_path(), Some(PathBuf::from("/var/log/g2i.log")));
    }

    #[test]
    fn test_load_missing_points_to_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config.json")).unwrap_err();
        assert!(err.to_string().contains("init"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app").join("config.json");
        let cfg = Config::new("u@example.com", "secret");
        cfg.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), cfg);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::new("u", "p").save(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = Config::new("u@example.com", "hunter2");
        let debug = format!("{:?}", cfg);
        assert!(debug.contains("u@example.com"));
        assert!(!debug.contains("hunter2"));

        let creds = cfg.credentials().unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_incomplete_credentials_rejected() {
        assert!(Config::new("u", "").credentials().is_err());
        assert!(Config::new("", "p").credentials().is_err());
    }

    #[test]
    fn test_app_paths() {
        let paths = AppPaths::resolve(Some("/tmp/g2i")).unwrap();
        assert_eq!(paths.dir(), Path::new("/tmp/g2i"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/g2i/config.json"));
        assert_eq!(paths.state_file(), PathBuf::from("/tmp/g2i/synced.json"));
        assert_eq!(paths.lock_file(), PathBuf::from("/tmp/g2i/sync.lock"));
    }
}
