use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::error::{ChatError, Result};

pub const HISTORY_FILE: &str = "chat_history.json";
pub const USERS_FILE: &str = "active_users.json";
pub const FILES_FILE: &str = "shared_files.json";
pub const CONFIG_FILE: &str = "config.yaml";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_ADMIN_PASSCODE: &str = "admin123";

pub const ENV_DIR: &str = "FLOCKCHAT_DIR";
pub const ENV_POLL_MS: &str = "FLOCKCHAT_POLL_MS";
pub const ENV_ADMIN_PASSCODE: &str = "FLOCKCHAT_ADMIN_PASSCODE";

/// Runtime settings shared by every client on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub admin_passcode: String,
}

/// Optional `config.yaml` inside the data directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    poll_interval_ms: Option<u64>,
    admin_passcode: Option<String>,
}

impl Config {
    /// Defaults for a given data directory, ignoring environment and files.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            admin_passcode: DEFAULT_ADMIN_PASSCODE.to_string(),
        }
    }

    /// Resolve settings: explicit `data_dir` > environment > `config.yaml` > defaults.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        Self::load_with(data_dir, |key| std::env::var(key).ok())
    }

    fn load_with(data_dir: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = data_dir
            .map(Path::to_path_buf)
            .or_else(|| lookup(ENV_DIR).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let file = read_file_config(&data_dir)?;
        let mut config = Self::with_data_dir(data_dir);

        let poll_ms = match lookup(ENV_POLL_MS) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                ChatError::Config(format!("{ENV_POLL_MS} must be a number of milliseconds, got '{raw}'"))
            })?),
            None => file.poll_interval_ms,
        };
        if let Some(ms) = poll_ms {
            config.poll_interval = Duration::from_millis(ms).max(MIN_POLL_INTERVAL);
        }

        if let Some(passcode) = lookup(ENV_ADMIN_PASSCODE).or(file.admin_passcode) {
            config.admin_passcode = passcode;
        }

        Ok(config)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    pub fn files_path(&self) -> PathBuf {
        self.data_dir.join(FILES_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "flockchat") {
        return dirs.config_dir().to_path_buf();
    }
    BaseDirs::new()
        .map(|b| b.home_dir().join(".flockchat"))
        .unwrap_or_else(|| PathBuf::from(".flockchat"))
}

fn read_file_config(data_dir: &Path) -> Result<FileConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(&path)?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw)
        .map_err(|e| ChatError::Config(format!("{}: {e}", path.display())))
}
