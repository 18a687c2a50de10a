use std::path::Path;
use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use shared::types::Button;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub panel: PanelConfig,
    pub wake: WakeConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeConfig {
    /// Hardware address of the machine to wake, colon/hyphen/bare hex
    pub mac: String,
    #[serde(default = "default_broadcast")]
    pub broadcast: String,
    /// Targets that must all become reachable, in order, before a
    /// wake-confirmation job completes
    #[serde(default)]
    pub poll_targets: Vec<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Maximum total wait for a confirmation job; absent means poll forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub ping_timeout_secs: u64,
}

/// Persisted runtime flags. Written back when maintenance mode changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub maintenance: bool,
}

fn default_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_broadcast() -> String {
    shared::protocol::DEFAULT_WAKE_BROADCAST.to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_probe_timeout() -> u64 {
    1
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_probe_timeout(),
            ping_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { maintenance: false }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write configuration back to disk, used to persist the maintenance flag
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
