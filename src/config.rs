//! Configuration management for the blockchain demo

use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on concurrently held ledgers.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Range the "mine" action draws its proof from. The proof is never checked
/// against a difficulty target.
#[derive(Debug, Clone, Deserialize)]
pub struct MiningConfig {
    #[serde(default = "default_proof_min")]
    pub proof_min: u64,
    #[serde(default = "default_proof_max")]
    pub proof_max: u64,
}

impl MiningConfig {
    pub fn proof_range(&self) -> RangeInclusive<u64> {
        self.proof_min..=self.proof_max
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            proof_min: default_proof_min(),
            proof_max: default_proof_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| ChainError::ConfigError(format!("unknown log level '{}'", self.level)))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_sessions() -> usize {
    1024
}

fn default_proof_min() -> u64 {
    1000
}

fn default_proof_max() -> u64 {
    9999
}

fn default_level() -> String {
    "info".to_string()
}

/// Load `config.toml` from the working directory, falling back to defaults
/// when the file is absent.
pub fn load_config() -> Result<Config> {
    load_config_from(CONFIG_FILE)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        parse_config(&config_str)?
    } else {
        Config::default()
    };
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(ChainError::ConfigError(
            "server.port must be non-zero".to_string(),
        ));
    }
    if config.server.max_sessions == 0 {
        return Err(ChainError::ConfigError(
            "server.max_sessions must be at least 1".to_string(),
        ));
    }
    if config.mining.proof_min > config.mining.proof_max {
        return Err(ChainError::ConfigError(format!(
            "mining.proof_min ({}) exceeds mining.proof_max ({})",
            config.mining.proof_min, config.mining.proof_max
        )));
    }
    config.logging.tracing_level()?;
    Ok(())
}
