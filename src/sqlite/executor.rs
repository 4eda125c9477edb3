use crate::error::DbError;
use crate::results::{CustomDbRow, ResultSet, WriteResult};
use crate::translation::{StatementKind, classify};
use crate::types::RowValues;

use super::connection::SqliteConnection;
use super::params::Params;
use super::query::build_result_set;

/// Run a read statement and return every row.
///
/// # Errors
/// Returns `DbError::SqliteError` if preparation or execution fails.
pub async fn execute_select(
    conn: &SqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, DbError> {
    let sql = query.to_owned();
    let params = Params::convert(params);
    conn.with_connection(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        build_result_set(&mut stmt, params.as_values(), None)
    })
    .await
}

/// Run a read statement and return the first row, if any.
///
/// # Errors
/// Returns `DbError::SqliteError` if preparation or execution fails.
pub async fn execute_get(
    conn: &SqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<Option<CustomDbRow>, DbError> {
    let sql = query.to_owned();
    let params = Params::convert(params);
    conn.with_connection(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rs = build_result_set(&mut stmt, params.as_values(), Some(1))?;
        Ok(rs.into_first())
    })
    .await
}

/// Run a write statement and report its identity and change count.
///
/// # Errors
/// Returns `DbError::SqliteError` if preparation or execution fails.
pub async fn execute_dml(
    conn: &SqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<WriteResult, DbError> {
    let sql = query.to_owned();
    let params = Params::convert(params);
    conn.with_connection(move |conn| execute_dml_sync(conn, &sql, &params))
        .await
}

/// Synchronous write used by both the plain verb and the transaction runner.
///
/// `changes()` and `last_insert_rowid()` keep their value from the previous
/// write, so they are only read for statements that actually update them.
/// An insert reports an id only when `last_insert_rowid()` moved: inserts into
/// `WITHOUT ROWID` tables and upserts that took the update path report 0. An
/// insert that reuses the exact rowid of the connection's previous insert
/// (delete, then reinsert without `AUTOINCREMENT`) also reports 0.
pub(crate) fn execute_dml_sync(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &Params,
) -> Result<WriteResult, DbError> {
    let kind = classify(sql);
    let rowid_before = conn.last_insert_rowid();
    let readonly = {
        let mut stmt = conn.prepare_cached(sql)?;
        let readonly = stmt.readonly();
        let mut rows = stmt.query(&params.as_refs()[..])?;
        while rows.next()?.is_some() {}
        readonly
    };

    let counts = kind.counts_changes() || (kind == StatementKind::With && !readonly);
    let rows_affected = if counts { conn.changes() } else { 0 };
    let rowid_after = conn.last_insert_rowid();
    let fresh_rowid = rowid_after != rowid_before;
    let inserted_id = if kind.generates_identity() && rows_affected > 0 && fresh_rowid {
        rowid_after
    } else {
        0
    };

    Ok(WriteResult::new(inserted_id, rows_affected))
}
