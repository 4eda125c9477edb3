use std::path::{Path, PathBuf};

use crate::error::DbError;

use super::connection::SqliteConnection;

/// Open the single embedded handle at `db_path`.
///
/// Creates the containing directory when it does not exist yet and turns on
/// foreign-key enforcement, which `SQLite` leaves off per connection.
///
/// # Errors
/// Returns `DbError::IoError` if the storage directory cannot be created and
/// `DbError::SqliteError` if the file cannot be opened or configured.
pub async fn open_database(db_path: &Path) -> Result<SqliteConnection, DbError> {
    let parent = db_path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        if !tokio::fs::try_exists(parent).await? {
            tokio::fs::create_dir_all(parent).await?;
            tracing::debug!(dir = %parent.display(), "created sqlite storage directory");
        }
    }

    let path: PathBuf = db_path.to_path_buf();
    let open_path = path.clone();
    let conn = tokio::task::spawn_blocking(move || -> Result<rusqlite::Connection, DbError> {
        let conn = rusqlite::Connection::open(&open_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    })
    .await
    .map_err(|e| DbError::ConnectionError(format!("sqlite open join error: {e}")))??;

    tracing::info!(path = %path.display(), "sqlite database initialized");
    Ok(SqliteConnection::new(conn, path))
}
