use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ExplorerConfig;
use crate::scoring::ScoringWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub scoring: ScoringWeights,
    pub explorer: ExplorerConfig,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub polling: PollingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
    /// Write each computed score back to the store.
    pub persist_scores: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    pub interval_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Onchain Rank".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
                environment: Environment::Development,
            },
            scoring: ScoringWeights::default(),
            explorer: ExplorerConfig::default(),
            database: DatabaseSettings {
                url: "sqlite://onchain_rank.db".to_string(),
                max_connections: 5,
                connect_timeout_seconds: 30,
                persist_scores: false,
            },
            cache: CacheSettings {
                ttl_seconds: 300,
                max_entries: 10_000,
            },
            polling: PollingSettings {
                interval_seconds: 60,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                // e.g. ONCHAIN_RANK_EXPLORER__API_KEY
                config::Environment::with_prefix("ONCHAIN_RANK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.scoring.validate()?;
        self.explorer.validate()?;

        if self.polling.interval_seconds == 0 {
            return Err("Polling interval must be at least one second".to_string());
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(format!("Unsupported database URL: {}", self.database.url));
        }

        Ok(())
    }
}
