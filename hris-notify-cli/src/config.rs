//! Configuration management for the HRIS notification CLI.

use anyhow::{Context, Result};
use hris_notify::{HrisClient, RealtimeConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Resync period used when the config file does not set one.
const DEFAULT_RESYNC_SECS: u64 = 60;

/// CLI configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// API base URL, e.g. `http://localhost:8081/api/v1`.
    pub base_url: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// Delay before reconnecting the push channel.
    pub reconnect_interval_ms: Option<u64>,
    /// Full list refresh period while watching. `0` disables it.
    pub resync_interval_secs: Option<u64>,
}

impl Config {
    /// Real-time settings derived from this file.
    pub fn realtime(&self) -> RealtimeConfig {
        let mut config = RealtimeConfig::default();

        if let Some(ms) = self.reconnect_interval_ms {
            config.reconnect_interval = Duration::from_millis(ms);
        }

        config.resync_interval = match self.resync_interval_secs.unwrap_or(DEFAULT_RESYNC_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        config
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

/// Get the configuration file path.
pub fn config_path() -> Result<PathBuf> {
    let exe_path = env::current_exe().context("Could not determine executable path")?;
    let exe_dir = exe_path
        .parent()
        .context("Could not determine executable directory")?;

    Ok(exe_dir.join("hris-notify.toml"))
}

/// Load configuration from file.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).context("Failed to read config file")?;

    toml::from_str(&content).context("Failed to parse config file")
}

/// Save configuration to file.
pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content).context("Failed to write config file")?;

    Ok(())
}

/// Build a client from the config file, with command-line overrides applied.
pub fn build_client(overrides: &Overrides) -> Result<HrisClient> {
    let config = load_config()?;

    let mut builder = HrisClient::builder();

    if let Some(url) = overrides.base_url.clone().or(config.base_url) {
        builder = builder.base_url(url);
    }
    if let Some(token) = overrides.token.clone().or(config.token) {
        builder = builder.token(token);
    }

    builder.build().context("Failed to build HRIS client")
}

/// Build a client that requires a token.
pub fn build_authed_client(overrides: &Overrides) -> Result<HrisClient> {
    let client = build_client(overrides)?;

    if !client.is_authenticated() {
        anyhow::bail!("Authentication required. Run 'hris-notify auth login' first.");
    }

    Ok(client)
}
