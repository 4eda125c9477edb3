use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use crate::config::BackendConfig;
use crate::error::DbError;

/// Build the bounded `MySQL` pool described by `cfg`.
///
/// Idle connections are never reaped, and one connection is opened eagerly so
/// bad credentials or an unreachable host fail here rather than later.
///
/// # Errors
/// Returns `DbError::ConfigError` for a zero pool capacity and
/// `DbError::MysqlError` if the first connection cannot be established.
pub async fn connect_pool(cfg: &BackendConfig) -> Result<MySqlPool, DbError> {
    if cfg.pool_capacity == 0 {
        return Err(DbError::ConfigError(
            "db_pool_size must be at least 1".to_string(),
        ));
    }

    let connect = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.schema_name);

    let pool = MySqlPoolOptions::new()
        .max_connections(cfg.pool_capacity)
        .acquire_timeout(cfg.acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect)
        .await?;

    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.schema_name,
        pool_capacity = cfg.pool_capacity,
        "mysql pool initialized"
    );
    Ok(pool)
}
