//! Configuration
//!
//! Loaded from `.rams.yaml` in the working directory, falling back to the
//! user config directory, with environment overrides on top. Missing or
//! unreadable files fall back to defaults - configuration problems never
//! stop the CLI from running against an explicitly given URL.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the RAMS backend.
    pub api_url: String,
    /// Work order number used when a command does not name one.
    pub work_order: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            work_order: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration with precedence: env vars over the local
    /// `.rams.yaml` over the user config file over defaults.
    pub fn load() -> Self {
        let mut config = Self::from_file(PathBuf::from(".rams.yaml"))
            .or_else(|| Self::from_file(Self::user_config_path()?))
            .unwrap_or_default();

        if let Ok(url) = std::env::var("RAMS_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(number) = std::env::var("RAMS_WORK_ORDER") {
            if !number.trim().is_empty() {
                config.work_order = Some(number);
            }
        }

        config
    }

    fn from_file(path: PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    fn user_config_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "rams")?;
        Some(dirs.config_dir().join("config.yaml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
