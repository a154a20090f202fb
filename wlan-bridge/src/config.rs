use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wlan::TimeoutConfig;

const DEFAULT_WATCH_INTERVAL_MS: u64 = 5_000;

/// Settings read from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub connection_timeout_secs: u64,
    pub disconnect_timeout_secs: u64,
    pub scan_wait_ms: u64,
    /// Pause between scans for `watch`.
    pub watch_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let timeouts = TimeoutConfig::default();
        Self {
            connection_timeout_secs: timeouts.connection_timeout.as_secs(),
            disconnect_timeout_secs: timeouts.disconnect_timeout.as_secs(),
            scan_wait_ms: timeouts.scan_wait.as_millis() as u64,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

/// Directory holding the bridge's files, e.g. `~/.config/wlan`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join("wlan"))
}

impl BridgeConfig {
    /// Loads `explicit` if given, otherwise the default file when it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        match config_dir().map(|dir| dir.join("config.json")) {
            Some(path) if path.exists() => Self::read(&path),
            _ => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn timeout_config(&self) -> TimeoutConfig {
        TimeoutConfig::new()
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs))
            .with_disconnect_timeout(Duration::from_secs(self.disconnect_timeout_secs))
            .with_scan_wait(Duration::from_millis(self.scan_wait_ms))
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}
