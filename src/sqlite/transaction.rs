use crate::error::DbError;
use crate::results::WriteResult;
use crate::types::Statement;

use super::connection::SqliteConnection;
use super::executor::execute_dml_sync;
use super::params::Params;

/// Run `statements` in order inside one `SQLite` transaction.
///
/// The handle stays locked from `BEGIN` until `COMMIT`/`ROLLBACK`, so no other
/// operation can interleave with the transaction. On the first failure the
/// transaction is rolled back and that failure is returned.
///
/// # Errors
/// Returns the `DbError` from the failing statement or from `COMMIT`.
pub async fn run_transaction(
    conn: &SqliteConnection,
    statements: &[Statement],
) -> Result<Vec<WriteResult>, DbError> {
    let prepared: Vec<(String, Params)> = statements
        .iter()
        .map(|s| (s.query.clone(), Params::convert(&s.params)))
        .collect();

    conn.with_connection(move |conn| {
        let conn: &rusqlite::Connection = conn;
        conn.execute_batch("BEGIN TRANSACTION")?;

        let outcome = prepared
            .iter()
            .map(|(sql, params)| execute_dml_sync(conn, sql, params))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|results| {
                conn.execute_batch("COMMIT")?;
                Ok(results)
            });

        match outcome {
            Ok(results) => Ok(results),
            Err(err) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback_err, "sqlite rollback failed");
                }
                Err(err)
            }
        }
    })
    .await
}
