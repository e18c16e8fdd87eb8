//! User settings (log level, poll interval, backend commands)
//!
//! Stored as JSON next to the profile document. Missing or unreadable
//! settings fall back to defaults so the tool always starts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{kscreen, polling, xrandr};

/// Commands used to query and drive one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendCommands {
    /// Lists outputs; its text is parsed for connected displays
    pub query: Vec<String>,
    /// For xrandr, the program prefix of the apply invocation.
    /// For kscreen, the complete restore command.
    pub restore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_xrandr_commands")]
    pub xrandr: BackendCommands,
    #[serde(default = "default_kscreen_commands")]
    pub kscreen: BackendCommands,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_secs() -> u64 {
    polling::DEFAULT_INTERVAL_SECS
}

fn default_xrandr_commands() -> BackendCommands {
    BackendCommands {
        query: vec![xrandr::PROGRAM.to_string(), xrandr::QUERY_ARG.to_string()],
        restore: vec![xrandr::PROGRAM.to_string()],
    }
}

fn default_kscreen_commands() -> BackendCommands {
    BackendCommands {
        query: vec![kscreen::PROGRAM.to_string(), kscreen::OUTPUTS_ARG.to_string()],
        restore: vec![kscreen::PROGRAM.to_string(), kscreen::OUTPUTS_ARG.to_string()],
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_interval_secs: default_poll_interval_secs(),
            xrandr: default_xrandr_commands(),
            kscreen: default_kscreen_commands(),
        }
    }
}

/// Directory holding both settings and profiles
pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(crate::constants::config::APP_DIR);
    path
}

impl Settings {
    pub fn path() -> PathBuf {
        config_dir().join(crate::constants::config::SETTINGS_FILENAME)
    }

    /// Read the per-user settings without logging.
    /// Problems are returned so they can be reported once logging is up.
    pub fn read() -> (Self, Vec<String>) {
        Self::read_from(&Self::path())
    }

    /// Settings from `path`, falling back to defaults on any problem
    pub fn read_from(path: &Path) -> (Self, Vec<String>) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return (Self::default(), Vec::new()),
        };

        match serde_json::from_str::<Settings>(&contents) {
            Ok(mut settings) => {
                let problems = settings.validate_and_clamp();
                (settings, problems)
            }
            Err(e) => {
                let problem = format!("Failed to parse settings, using defaults: {}", e);
                (Self::default(), vec![problem])
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    fn validate_and_clamp(&mut self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.poll_interval_secs < polling::MIN_INTERVAL_SECS {
            problems.push(format!(
                "poll_interval_secs {} below minimum, clamping to {}",
                self.poll_interval_secs,
                polling::MIN_INTERVAL_SECS
            ));
            self.poll_interval_secs = polling::MIN_INTERVAL_SECS;
        }
        problems
    }
}
