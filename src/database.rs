use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::BackendConfig;
use crate::error::DbError;
use crate::executor::DatabaseExecutor;
use crate::results::{CustomDbRow, ResultSet, WriteResult};
use crate::types::{BackendKind, RowValues, Statement};

#[cfg(feature = "mysql")]
use crate::mysql;
#[cfg(feature = "mysql")]
use crate::translation::{Rewritten, rewrite_for_networked};
#[cfg(feature = "sqlite")]
use crate::sqlite::{self, SqliteConnection};

/// The live connection resource.
enum Backend {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteConnection),
    #[cfg(feature = "mysql")]
    Mysql(sqlx::MySqlPool),
}

impl Backend {
    fn kind(&self) -> BackendKind {
        match self {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(_) => BackendKind::Sqlite,
            #[cfg(feature = "mysql")]
            Backend::Mysql(_) => BackendKind::Mysql,
        }
    }
}

enum ConfigSource {
    Resolved(BackendConfig),
    SettingsFile(PathBuf),
}

/// Application-wide data access handle.
///
/// Construction is cheap and does no I/O. The backend is chosen and connected
/// on the first operation (or an explicit [`Database::ensure_initialized`]);
/// a failed attempt is not remembered, so the next operation tries again.
/// Share it behind an `Arc`.
pub struct Database {
    source: ConfigSource,
    backend: OnceCell<Backend>,
}

impl Database {
    /// Use an already resolved configuration.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            source: ConfigSource::Resolved(config),
            backend: OnceCell::new(),
        }
    }

    /// Read the configuration from the JSON settings file at `path` when
    /// first initialized.
    #[must_use]
    pub fn from_settings_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ConfigSource::SettingsFile(path.into()),
            backend: OnceCell::new(),
        }
    }

    /// Select and connect the backend if that has not happened yet.
    ///
    /// # Errors
    /// Returns the configuration or connection error that prevented
    /// initialization. Nothing falls back to another backend.
    pub async fn ensure_initialized(&self) -> Result<(), DbError> {
        self.backend().await.map(|_| ())
    }

    /// Whether a backend has been connected.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    /// The connected backend's kind, once initialized.
    #[must_use]
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.get().map(Backend::kind)
    }

    /// Close the networked pool, waiting for leased connections to return.
    /// The embedded handle closes when the `Database` is dropped.
    pub async fn close(&self) {
        match self.backend.get() {
            #[cfg(feature = "mysql")]
            Some(Backend::Mysql(pool)) => {
                pool.close().await;
                tracing::info!("mysql pool closed");
            }
            #[cfg(feature = "sqlite")]
            Some(Backend::Sqlite(_)) => {}
            None => {}
        }
    }

    async fn backend(&self) -> Result<&Backend, DbError> {
        self.backend.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Backend, DbError> {
        let config = match &self.source {
            ConfigSource::Resolved(config) => config.clone(),
            ConfigSource::SettingsFile(path) => BackendConfig::from_settings_file(path).await?,
        };
        match config.kind {
            BackendKind::Sqlite => open_sqlite(&config).await,
            BackendKind::Mysql => open_mysql(&config).await,
        }
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(config: &BackendConfig) -> Result<Backend, DbError> {
    Ok(Backend::Sqlite(
        sqlite::open_database(&config.storage_path).await?,
    ))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_config: &BackendConfig) -> Result<Backend, DbError> {
    Err(DbError::Unimplemented(
        "sqlite support is not compiled into this build".to_string(),
    ))
}

#[cfg(feature = "mysql")]
async fn open_mysql(config: &BackendConfig) -> Result<Backend, DbError> {
    Ok(Backend::Mysql(mysql::connect_pool(config).await?))
}

#[cfg(not(feature = "mysql"))]
async fn open_mysql(_config: &BackendConfig) -> Result<Backend, DbError> {
    Err(DbError::Unimplemented(
        "mysql support is not compiled into this build".to_string(),
    ))
}

#[async_trait]
impl DatabaseExecutor for Database {
    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, DbError> {
        match self.backend().await? {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => sqlite::execute_select(conn, query, params).await,
            #[cfg(feature = "mysql")]
            Backend::Mysql(pool) => match rewrite_for_networked(query) {
                Rewritten::Skip => Ok(ResultSet::default()),
                Rewritten::Sql(sql) => mysql::execute_select(pool, &sql, params).await,
            },
        }
    }

    async fn get(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, DbError> {
        match self.backend().await? {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => sqlite::execute_get(conn, query, params).await,
            #[cfg(feature = "mysql")]
            Backend::Mysql(pool) => match rewrite_for_networked(query) {
                Rewritten::Skip => Ok(None),
                Rewritten::Sql(sql) => mysql::execute_get(pool, &sql, params).await,
            },
        }
    }

    async fn execute(&self, query: &str, params: &[RowValues]) -> Result<WriteResult, DbError> {
        match self.backend().await? {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => sqlite::execute_dml(conn, query, params).await,
            #[cfg(feature = "mysql")]
            Backend::Mysql(pool) => match rewrite_for_networked(query) {
                Rewritten::Skip => Ok(WriteResult::none()),
                Rewritten::Sql(sql) => mysql::execute_dml(pool, &sql, params).await,
            },
        }
    }

    async fn transaction(&self, statements: &[Statement]) -> Result<Vec<WriteResult>, DbError> {
        match self.backend().await? {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => sqlite::run_transaction(conn, statements).await,
            #[cfg(feature = "mysql")]
            Backend::Mysql(pool) => mysql::run_transaction(pool, statements).await,
        }
    }
}
