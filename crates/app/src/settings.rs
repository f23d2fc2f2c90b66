//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `TALLY__`-prefixed environment variables (e.g. `TALLY__SERVER__PORT`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
            database: Database::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Analytics {
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for Analytics {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub analytics: Analytics,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_query_timeout_ms() -> u64 {
    engine::DEFAULT_QUERY_TIMEOUT.as_millis() as u64
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("TALLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
