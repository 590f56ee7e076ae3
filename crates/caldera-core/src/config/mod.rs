use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_ENCODING, ENCODING_SECTION, REQUEST_ENCODING_KEY};

const REQUEST_ENCODING_PATH: &str =
    const_str::concat!(ENCODING_SECTION, ".", REQUEST_ENCODING_KEY);
const STOCK_ENCODING_PATH: &str = const_str::concat!(ENCODING_SECTION, ".stock");

/// Environment variable naming an alternative configuration file.
pub const CONFIG_FILE_ENV: &str = "CALDERA_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub encoding: EncodingConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub acl: AclConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
    pub max_body_size: usize,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the listen origin in the format `http://host:port`.
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the public origin, preferring the configured one.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.clone()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// Charset of request bodies that do not name one.
    pub request: String,
    /// Charset of calendar files on disk.
    pub stock: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub folder: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AclConfig {
    /// Known principals. Empty means every owner folder found in storage.
    #[serde(default)]
    pub principals: Vec<String>,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional TOML file and
    /// environment variables, in increasing precedence.
    ///
    /// Environment variables use the `CALDERA_` prefix and `__` between
    /// section and key, e.g. `CALDERA_ENCODING__REQUEST=iso-8859-1`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&file)
    }

    /// ## Summary
    /// Same as [`Settings::load`] with an explicit configuration file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load_from(file: &str) -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5232)?
            .set_default("server.max_body_size", 10 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default(REQUEST_ENCODING_PATH, DEFAULT_ENCODING)?
            .set_default(STOCK_ENCODING_PATH, DEFAULT_ENCODING)?
            .set_default("storage.folder", "calendars")?
            // TOML file
            .add_source(config::File::with_name(file).required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix("CALDERA")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("acl.principals"),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Looks up a string setting by section and key.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        match (section, key) {
            ("server", "host") => Some(&self.server.host),
            ("server", "serve_origin") => self.server.serve_origin.as_deref(),
            ("logging", "level") => Some(&self.logging.level),
            (ENCODING_SECTION, REQUEST_ENCODING_KEY) => Some(&self.encoding.request),
            (ENCODING_SECTION, "stock") => Some(&self.encoding.stock),
            ("storage", "folder") => Some(&self.storage.folder),
            _ => None,
        }
    }

    /// Charset applied to request bodies without a `charset=` parameter,
    /// read from `encoding.request`.
    #[must_use]
    pub fn default_request_encoding(&self) -> &str {
        self.get(ENCODING_SECTION, REQUEST_ENCODING_KEY)
            .unwrap_or(DEFAULT_ENCODING)
    }
}

/// ## Summary
/// Loads configuration from environment variables, `.env` and `config.toml`.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
