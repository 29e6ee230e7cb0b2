//! Runtime settings, read from `TFORUM_*` environment variables (a `.env`
//! file is loaded first when present).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Profile directory used by the `store-local` backend.
    pub data_dir: PathBuf,
    /// Connection string used by the `store-sqlite` backend.
    pub database_url: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("data_dir", "./data/forum")?
            .set_default("database_url", "sqlite:trade_forum.db")?
            .add_source(Environment::with_prefix("TFORUM"))
            .build()?
            .try_deserialize()
    }
}
