use std::time::Duration;

use db::{MatchOperator, StoreOptions};
use eyre::{Context as _, Result};
use serde::{Deserialize, Serialize};

const fn default_max_connections() -> u32 {
    10
}

const fn default_acquire_timeout_secs() -> u64 {
    5
}

const fn default_port() -> u16 {
    3100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub env: Environment,

    /// Which store keeps the doctor records.
    #[serde(default)]
    pub storage: StorageBackend,

    /// Connection string of the Postgres database. Required for [`StorageBackend::Postgres`].
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// How the `gender` filter of the doctor list is matched.
    #[serde(default)]
    pub gender_match: MatchOperator,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Configuration {
    /// Loads the configuration from environment variables, and configuration files.
    pub fn load() -> Result<Self> {
        let mut cfg =
            config::Config::builder().add_source(config::Environment::with_prefix("DIRECTORY"));

        if let Ok(file) = std::env::var("DIRECTORY_CONFIG_FILE") {
            cfg = cfg.add_source(config::File::with_name(&file));
        }

        let cfg = cfg
            .build()
            .wrap_err("failed to build config")?
            .try_deserialize::<Self>()
            .wrap_err("failed to deserialize config")?;

        Ok(cfg)
    }

    #[inline]
    pub fn is_production(&self) -> bool {
        self.env == Environment::Production
    }

    /// Connection settings for the Postgres store.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            storage: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            gender_match: MatchOperator::default(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Environment {
    #[serde(rename = "development")]
    Development,

    #[serde(rename = "production")]
    #[default]
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,

    /// Keeps records in process memory, they are lost on restart.
    Memory,
}
