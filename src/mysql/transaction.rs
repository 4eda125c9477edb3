use sqlx::MySqlPool;

use crate::error::DbError;
use crate::results::WriteResult;
use crate::translation::{Rewritten, rewrite_for_networked};
use crate::types::Statement;

use super::query::execute_dml;

/// Run `statements` in order on one leased connection inside a `MySQL`
/// transaction.
///
/// Each statement goes through dialect translation; control statements are
/// skipped with a zero result. The leased connection returns to the pool
/// when the transaction handle drops, on every path.
///
/// # Errors
/// Returns the `DbError` from acquisition, `BEGIN`, the failing statement, or
/// `COMMIT`. A failing statement rolls the transaction back first.
pub async fn run_transaction(
    pool: &MySqlPool,
    statements: &[Statement],
) -> Result<Vec<WriteResult>, DbError> {
    let mut tx = pool.begin().await?;
    let mut results = Vec::with_capacity(statements.len());

    for stmt in statements {
        let outcome = match rewrite_for_networked(&stmt.query) {
            Rewritten::Skip => Ok(WriteResult::none()),
            Rewritten::Sql(sql) => execute_dml(&mut *tx, &sql, &stmt.params).await,
        };

        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "mysql rollback failed");
                }
                return Err(err);
            }
        }
    }

    tx.commit().await?;
    Ok(results)
}
