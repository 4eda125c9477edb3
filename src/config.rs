use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::DbError;
use crate::types::BackendKind;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_SCHEMA: &str = "gembok_bill";
pub const DEFAULT_POOL_CAPACITY: u32 = 20;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STORAGE_PATH: &str = "data/billing.db";

/// Resolved backend configuration.
///
/// Only the fields relevant to `kind` are consulted: `storage_path` for the
/// embedded backend, the connection and pool fields for the networked one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub schema_name: String,
    pub pool_capacity: u32,
    pub acquire_timeout: Duration,
    pub storage_path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Sqlite,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            schema_name: DEFAULT_SCHEMA.to_string(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl BackendConfig {
    /// Start an embedded configuration backed by the file at `storage_path`.
    #[must_use]
    pub fn sqlite_builder(storage_path: impl Into<PathBuf>) -> SqliteConfigBuilder {
        SqliteConfigBuilder {
            cfg: BackendConfig {
                kind: BackendKind::Sqlite,
                storage_path: storage_path.into(),
                ..BackendConfig::default()
            },
        }
    }

    /// Start a networked configuration for `schema_name` on `host`.
    #[must_use]
    pub fn mysql_builder(host: impl Into<String>, schema_name: impl Into<String>) -> MysqlConfigBuilder {
        MysqlConfigBuilder {
            cfg: BackendConfig {
                kind: BackendKind::Mysql,
                host: host.into(),
                schema_name: schema_name.into(),
                ..BackendConfig::default()
            },
        }
    }

    /// Read the backend configuration from the application's JSON settings file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns `DbError::IoError` if the file exists but cannot be read,
    /// `DbError::SettingsError` if it is not valid JSON, and
    /// `DbError::ConfigError` for an unknown `db_type` or a malformed number.
    pub async fn from_settings_file(path: &Path) -> Result<Self, DbError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "settings file not found, using database defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_settings_str(&raw)
    }

    /// Parse the backend configuration from settings JSON text. Unknown keys
    /// are ignored.
    ///
    /// # Errors
    /// See [`BackendConfig::from_settings_file`].
    pub fn from_settings_str(raw: &str) -> Result<Self, DbError> {
        let settings: Settings = serde_json::from_str(raw)?;
        settings.resolve()
    }
}

/// Fluent builder for an embedded configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfigBuilder {
    cfg: BackendConfig,
}

impl SqliteConfigBuilder {
    #[must_use]
    pub fn storage_path(mut self, storage_path: impl Into<PathBuf>) -> Self {
        self.cfg.storage_path = storage_path.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> BackendConfig {
        self.cfg
    }
}

/// Fluent builder for a networked configuration.
#[derive(Debug, Clone)]
pub struct MysqlConfigBuilder {
    cfg: BackendConfig,
}

impl MysqlConfigBuilder {
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.port = port;
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.cfg.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.cfg.password = password.into();
        self
    }

    #[must_use]
    pub fn pool_capacity(mut self, pool_capacity: u32) -> Self {
        self.cfg.pool_capacity = pool_capacity;
        self
    }

    /// How long an operation waits for a pooled connection before failing.
    #[must_use]
    pub fn acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.cfg.acquire_timeout = acquire_timeout;
        self
    }

    #[must_use]
    pub fn finish(self) -> BackendConfig {
        self.cfg
    }
}

/// Settings file keys. Anything else in the file belongs to the host
/// application and is ignored here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    db_type: Option<String>,
    db_host: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    db_port: Option<String>,
    db_user: Option<String>,
    db_password: Option<String>,
    db_name: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    db_pool_size: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    db_acquire_timeout_secs: Option<String>,
    db_path: Option<String>,
}

impl Settings {
    fn resolve(self) -> Result<BackendConfig, DbError> {
        let defaults = BackendConfig::default();
        let kind = match self.db_type.as_deref().map(str::trim) {
            None | Some("") => defaults.kind,
            Some(raw) => parse_kind(raw)?,
        };

        Ok(BackendConfig {
            kind,
            host: self.db_host.unwrap_or(defaults.host),
            port: parse_number("db_port", self.db_port)?.unwrap_or(defaults.port),
            user: self.db_user.unwrap_or(defaults.user),
            password: self.db_password.unwrap_or(defaults.password),
            schema_name: self.db_name.unwrap_or(defaults.schema_name),
            pool_capacity: parse_number("db_pool_size", self.db_pool_size)?
                .unwrap_or(defaults.pool_capacity),
            acquire_timeout: parse_number("db_acquire_timeout_secs", self.db_acquire_timeout_secs)?
                .map_or(defaults.acquire_timeout, Duration::from_secs),
            storage_path: self.db_path.map_or(defaults.storage_path, PathBuf::from),
        })
    }
}

fn parse_kind(raw: &str) -> Result<BackendKind, DbError> {
    match raw.to_ascii_lowercase().as_str() {
        "sqlite" | "embedded" => Ok(BackendKind::Sqlite),
        "mysql" | "networked" => Ok(BackendKind::Mysql),
        other => Err(DbError::ConfigError(format!("unknown db_type: {other}"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, DbError>
where
    T::Err: std::fmt::Display,
{
    raw.map(|s| {
        s.trim()
            .parse::<T>()
            .map_err(|e| DbError::ConfigError(format!("invalid {key} {s:?}: {e}")))
    })
    .transpose()
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}
