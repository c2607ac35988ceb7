use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_LOG_CAPACITY: usize = 200;
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

/// Dashboard settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the director event receiver binds to
    pub listen_addr: String,
    /// Lines kept in the log panel
    pub log_capacity: usize,
    /// UI redraw / event drain interval
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("renderdeck").join("config.json"))
}

/// Load from the default location, falling back to defaults when there is
/// no config dir or no file.
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::debug!("No config dir, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;

    if config.log_capacity == 0 {
        anyhow::bail!("log_capacity in {:?} must be at least 1", path);
    }

    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Write `config` to `path`, backing up any existing file first.
pub fn write_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if path.exists() {
        let backup_path = path.with_extension("json.bak");
        fs::copy(path, &backup_path)?;
        tracing::info!("Backed up config to {:?}", backup_path);
    }

    fs::write(path, serde_json::to_string_pretty(config)?)
        .with_context(|| format!("Failed to write config {:?}", path))?;
    tracing::info!("Wrote config to {:?}", path);
    Ok(())
}
