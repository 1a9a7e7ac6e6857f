//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::notify::DEFAULT_DISPLAY_DURATION;

/// Locale tag handed to text-to-speech; a Turkish voice reads the output best
const DEFAULT_SPEECH_LOCALE: &str = "tr-TR";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// How long notifications stay visible
    pub notify_duration: Duration,

    /// Locale tag used for speech requests
    pub speech_locale: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("qarghadili");

        Self::from_env(data_dir, |key| std::env::var(key).ok())
    }

    /// Build configuration for `data_dir`, reading overrides through `var`
    fn from_env(data_dir: PathBuf, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let socket_path = var("QARGHADILI_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let notify_duration = match var("QARGHADILI_NOTIFY_MS") {
            Some(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid QARGHADILI_NOTIFY_MS: {raw:?}"))?;
                Duration::from_millis(ms)
            }
            None => DEFAULT_DISPLAY_DURATION,
        };

        let speech_locale = var("QARGHADILI_SPEECH_LOCALE")
            .filter(|locale| !locale.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SPEECH_LOCALE.to_string());

        Ok(Self {
            socket_path,
            data_dir,
            notify_duration,
            speech_locale,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}
