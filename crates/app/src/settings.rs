//! Handles settings for the application. Configuration is written in
//! `settings.toml` and can be overridden with `WALLETS_` environment
//! variables, e.g. `WALLETS_SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub max_retries: Option<usize>,
}

/// Exchange-rate feed. Without a `url` the built-in quote table is used.
#[derive(Debug, Default, Deserialize)]
pub struct Rates {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Optional exchange-rate stub service.
#[derive(Debug, Deserialize)]
pub struct Xr {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub rates: Rates,
    pub xr: Option<Xr>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_source(File::with_name("settings").required(false))
    }

    fn from_source<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("WALLETS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
