//! Service configuration.
//!
//! Built once at startup from an optional YAML file and the environment
//! (`.env` is loaded first), then shared read-only with every handler.
//!
//! ```yaml
//! # config.yaml
//! DEFAULT_DAYS: 30
//! ROOT_URL: http://127.0.0.1:10000
//! SUBMIT_URL: /submit
//! GET_DOCUMENT_LIST_URL: /get_document_list
//! UPDATE_DOWNLOADED_URL: /update_downloaded
//! INIT_DB_URL: /init_db
//! CANONICAL_UTC_OFFSET: "+09:00"
//! FIELD_MAP:
//!   request_factory: /contents/fid16/label
//!   amount: /contents/fid3/value
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{Duration, FixedOffset};
use serde::Deserialize;

use crate::models::document::FieldMap;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const MAX_RETENTION_DAYS: i64 = 36_500;
pub const DEFAULT_CANONICAL_OFFSET: &str = "+09:00";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Missing(&'static str),
    Invalid(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config file error: {e}"),
            ConfigError::Yaml(e) => write!(f, "Invalid YAML in config file: {e}"),
            ConfigError::Missing(key) => write!(f, "Missing required setting {key}"),
            ConfigError::Invalid(errors) => write!(f, "Invalid configuration: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

/// Keys accepted in the YAML file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FileConfig {
    pub default_days: Option<i64>,
    pub root_url: Option<String>,
    pub submit_url: Option<String>,
    pub get_document_list_url: Option<String>,
    pub update_downloaded_url: Option<String>,
    pub init_db_url: Option<String>,
    pub canonical_utc_offset: Option<String>,
    pub field_map: Option<FieldMap>,
}

impl FileConfig {
    /// Read `path`; a missing file means all defaults.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(FileConfig::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Route paths for the five operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    pub status: String,
    pub submit: String,
    pub get_document_list: String,
    pub update_downloaded: String,
    pub init_db: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        EndpointPaths {
            status: "/".to_string(),
            submit: "/submit".to_string(),
            get_document_list: "/get_document_list".to_string(),
            update_downloaded: "/update_downloaded".to_string(),
            init_db: "/init_db".to_string(),
        }
    }
}

impl EndpointPaths {
    fn validate(&self) -> Vec<String> {
        let named = [
            ("SUBMIT_URL", &self.submit),
            ("GET_DOCUMENT_LIST_URL", &self.get_document_list),
            ("UPDATE_DOWNLOADED_URL", &self.update_downloaded),
            ("INIT_DB_URL", &self.init_db),
        ];
        let mut errors = vec![];
        for (key, path) in named {
            if !path.starts_with('/') {
                errors.push(format!("{key} must start with '/'"));
            }
            if path == &self.status {
                errors.push(format!("{key} collides with the status route"));
            }
        }
        for (i, (key_a, a)) in named.iter().enumerate() {
            for (key_b, b) in &named[i + 1..] {
                if a == b {
                    errors.push(format!("{key_a} and {key_b} are the same path"));
                }
            }
        }
        errors
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub secret_key: String,
    pub retention_days: i64,
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub paths: EndpointPaths,
    pub canonical_offset: FixedOffset,
    pub field_map: FieldMap,
    pub max_connections: u32,
    pub acquire_timeout: StdDuration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("retention_days", &self.retention_days)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("public_url", &self.public_url)
            .field("paths", &self.paths)
            .field("canonical_offset", &self.canonical_offset)
            .field("field_map", &self.field_map)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(format!("{key} has an invalid value: {raw:?}"));
            None
        }
    }
}

impl AppConfig {
    /// Load `.env`, the YAML file named by `CONFIG_FILE`, and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            log::warn!("Failed to load .env file: {err}");
        }

        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let file = FileConfig::read(Path::new(&path))?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with environment lookups; the environment wins.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let database_url = env("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let secret_key = env("SECRET_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let mut errors = vec![];

        let retention_days = parse_env::<i64>(&env, "DEFAULT_DAYS", &mut errors)
            .or(file.default_days)
            .unwrap_or(DEFAULT_RETENTION_DAYS);
        if !(0..=MAX_RETENTION_DAYS).contains(&retention_days) {
            errors.push(format!("DEFAULT_DAYS must be between 0 and {MAX_RETENTION_DAYS}"));
        }

        let host = env("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_env::<u16>(&env, "PORT", &mut errors).unwrap_or(10000);
        let public_url = file
            .root_url
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let defaults = EndpointPaths::default();
        let paths = EndpointPaths {
            status: defaults.status,
            submit: file.submit_url.unwrap_or(defaults.submit),
            get_document_list: file.get_document_list_url.unwrap_or(defaults.get_document_list),
            update_downloaded: file.update_downloaded_url.unwrap_or(defaults.update_downloaded),
            init_db: file.init_db_url.unwrap_or(defaults.init_db),
        };
        errors.extend(paths.validate());

        let offset_raw = env("CANONICAL_UTC_OFFSET")
            .or(file.canonical_utc_offset)
            .unwrap_or_else(|| DEFAULT_CANONICAL_OFFSET.to_string());
        let canonical_offset = match offset_raw.trim().parse::<FixedOffset>() {
            Ok(offset) if offset.local_minus_utc().abs() <= 14 * 3600 => Some(offset),
            Ok(_) => {
                errors.push(format!("CANONICAL_UTC_OFFSET {offset_raw:?} is outside +/-14:00"));
                None
            }
            Err(_) => {
                errors.push(format!("CANONICAL_UTC_OFFSET {offset_raw:?} is not an offset like +09:00"));
                None
            }
        };

        let field_map = file.field_map.unwrap_or_default();
        errors.extend(field_map.validate());

        let max_connections = parse_env::<u32>(&env, "DB_MAX_CONNECTIONS", &mut errors).unwrap_or(5);
        if max_connections == 0 {
            errors.push("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }
        let acquire_timeout = StdDuration::from_secs(
            parse_env::<u64>(&env, "DB_ACQUIRE_TIMEOUT_SECS", &mut errors).unwrap_or(10),
        );

        let canonical_offset = match canonical_offset {
            Some(offset) if errors.is_empty() => offset,
            _ => return Err(ConfigError::Invalid(errors)),
        };

        Ok(AppConfig {
            database_url,
            secret_key,
            retention_days,
            host,
            port,
            public_url,
            paths,
            canonical_offset,
            field_map,
            max_connections,
            acquire_timeout,
        })
    }

    /// How long a downloaded document stays visible in the listing.
    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
