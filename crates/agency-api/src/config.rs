//! # Configuration
//!
//! [`AppConfig`] is assembled in three layers: built-in defaults, an optional
//! YAML file named by `AGENCY_CONFIG`, then individual environment variables.
//! Later layers win.
//!
//! | Variable | YAML key | Default |
//! |---|---|---|
//! | `PORT` | `port` | 8080 |
//! | `AUTH_TOKEN` | `auth_token` | unset (auth disabled) |
//! | `DATABASE_URL` | `database_url` | unset (in-memory only) |
//! | `DB_MAX_CONNECTIONS` | `db_max_connections` | 10 |
//! | `DB_IDLE_TIMEOUT_SECS` | `db_idle_timeout_secs` | 300 |
//! | `SEARCH_LIMIT` | `search_limit` | 10 |
//! | `PAGE_SIZE` | `page_size` | 20 |
//! | `MAX_PAGE_SIZE` | `max_page_size` | 100 |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Hard ceiling for the per-category global search limit.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. `None` disables authentication.
    pub auth_token: Option<String>,
    /// Postgres connection string. `None` runs in-memory only.
    pub database_url: Option<String>,
    /// Upper bound of the connection pool.
    pub db_max_connections: u32,
    /// Seconds an idle pooled connection is kept.
    pub db_idle_timeout_secs: u64,
    /// Default per-category cap for global search.
    pub search_limit: usize,
    /// Default list page size.
    pub page_size: usize,
    /// Largest page size a client may request.
    pub max_page_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_idle_timeout_secs", &self.db_idle_timeout_secs)
            .field("search_limit", &self.search_limit)
            .field("page_size", &self.page_size)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            database_url: None,
            db_max_connections: 10,
            db_idle_timeout_secs: 300,
            search_limit: 10,
            page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`FileConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// An environment variable holds an unparsable value.
    #[error("invalid value for {key}: \"{value}\"")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Keys accepted in the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub auth_token: Option<String>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_idle_timeout_secs: Option<u64>,
    pub search_limit: Option<usize>,
    pub page_size: Option<usize>,
    pub max_page_size: Option<usize>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(|key| std::env::var(key).ok())
    }

    /// Load using `env` as the variable source. `AGENCY_CONFIG`, when set,
    /// names the YAML file applied before individual variables.
    pub fn from_sources(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = env("AGENCY_CONFIG").filter(|p| !p.trim().is_empty()) {
            config.apply_file(FileConfig::load(Path::new(path.trim()))?);
        }

        if let Some(v) = parse_var(&env, "PORT")? {
            config.port = v;
        }
        if let Some(token) = env("AUTH_TOKEN").filter(|t| !t.is_empty()) {
            config.auth_token = Some(token);
        }
        if let Some(url) = env("DATABASE_URL").filter(|u| !u.is_empty()) {
            config.database_url = Some(url);
        }
        if let Some(v) = parse_var(&env, "DB_MAX_CONNECTIONS")? {
            config.db_max_connections = v;
        }
        if let Some(v) = parse_var(&env, "DB_IDLE_TIMEOUT_SECS")? {
            config.db_idle_timeout_secs = v;
        }
        if let Some(v) = parse_var(&env, "SEARCH_LIMIT")? {
            config.search_limit = v;
        }
        if let Some(v) = parse_var(&env, "PAGE_SIZE")? {
            config.page_size = v;
        }
        if let Some(v) = parse_var(&env, "MAX_PAGE_SIZE")? {
            config.max_page_size = v;
        }

        Ok(config.clamped())
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.port {
            self.port = v;
        }
        if file.auth_token.is_some() {
            self.auth_token = file.auth_token;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if let Some(v) = file.db_max_connections {
            self.db_max_connections = v;
        }
        if let Some(v) = file.db_idle_timeout_secs {
            self.db_idle_timeout_secs = v;
        }
        if let Some(v) = file.search_limit {
            self.search_limit = v;
        }
        if let Some(v) = file.page_size {
            self.page_size = v;
        }
        if let Some(v) = file.max_page_size {
            self.max_page_size = v;
        }
    }

    /// Pull limits back into their valid ranges.
    fn clamped(mut self) -> Self {
        self.db_max_connections = self.db_max_connections.max(1);
        self.max_page_size = self.max_page_size.max(1);
        self.page_size = self.page_size.clamp(1, self.max_page_size);
        self.search_limit = self.search_limit.clamp(1, MAX_SEARCH_LIMIT);
        self
    }
}

fn parse_var<T: FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
