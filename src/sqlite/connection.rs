use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::DbError;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// The one persistent `SQLite` handle.
///
/// Every operation runs on a blocking thread while holding the handle's lock,
/// so statements against the handle are strictly serialized.
#[derive(Clone)]
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
    path: PathBuf,
}

impl SqliteConnection {
    pub(crate) fn new(conn: rusqlite::Connection, path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        }
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run synchronous `rusqlite` logic against the handle.
    ///
    /// # Errors
    /// Propagates any `DbError` raised by `func`, or `DbError::ConnectionError`
    /// if the blocking task cannot be joined.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, DbError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, DbError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(conn: SharedSqliteConnection, func: F) -> Result<R, DbError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, DbError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| DbError::ConnectionError(format!("sqlite spawn_blocking join error: {e}")))?
}
