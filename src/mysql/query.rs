use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::mysql::{MySqlRow, MySqlValueRef};
use sqlx::{Column, Executor, MySql, MySqlPool, Row, TypeInfo, Value, ValueRef};

use crate::error::DbError;
use crate::results::{CustomDbRow, ResultSet, WriteResult};
use crate::types::RowValues;

use super::params::bind_params;

/// Decode one `MySQL` cell into a `RowValues`.
///
/// # Errors
/// Returns `DbError::MysqlError` if the driver cannot decode the value.
pub fn mysql_extract_value(value: &MySqlValueRef<'_>) -> Result<RowValues, DbError> {
    if value.is_null() {
        return Ok(RowValues::Null);
    }
    let owned = sqlx::ValueRef::to_owned(value);
    let type_name = value.type_info().name().to_ascii_uppercase();

    let decoded = match type_name.as_str() {
        "BOOLEAN" | "BOOL" => RowValues::Bool(owned.try_decode()?),
        name if name.ends_with("UNSIGNED") => {
            let n: u64 = owned.try_decode()?;
            // Values past i64::MAX keep their digits as text
            i64::try_from(n).map_or_else(|_| RowValues::Text(n.to_string()), RowValues::Int)
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            RowValues::Int(owned.try_decode()?)
        }
        "YEAR" => RowValues::Int(i64::from(owned.try_decode::<u16>()?)),
        "BIT" => {
            let n: u64 = owned.try_decode()?;
            i64::try_from(n).map_or_else(|_| RowValues::Text(n.to_string()), RowValues::Int)
        }
        "FLOAT" | "DOUBLE" => RowValues::Float(owned.try_decode()?),
        "DECIMAL" => decimal_to_row_value(owned.try_decode()?),
        "DATETIME" | "TIMESTAMP" => RowValues::Timestamp(owned.try_decode::<NaiveDateTime>()?),
        "DATE" => RowValues::Text(owned.try_decode::<NaiveDate>()?.format("%F").to_string()),
        "TIME" => RowValues::Text(owned.try_decode::<NaiveTime>()?.format("%T").to_string()),
        "JSON" => RowValues::JSON(owned.try_decode::<serde_json::Value>()?),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            RowValues::Blob(owned.try_decode()?)
        }
        _ => RowValues::Text(owned.try_decode()?),
    };
    Ok(decoded)
}

/// `DECIMAL` covers plain columns and also `SUM`/`AVG` results. Whole numbers
/// become `Int` and the rest `Float`, which is what `SQLite` returns for the
/// same expressions. Digits that fit neither stay as text.
#[must_use]
pub fn decimal_to_row_value(value: Decimal) -> RowValues {
    if value.scale() == 0 {
        if let Some(i) = value.to_i64() {
            return RowValues::Int(i);
        }
    }
    value
        .to_f64()
        .map_or_else(|| RowValues::Text(value.to_string()), RowValues::Float)
}

/// Collect fetched rows into a `ResultSet`. Column names come from the first
/// row, so an empty result carries none.
///
/// # Errors
/// Returns `DbError::MysqlError` if any cell fails to decode.
pub fn build_result_set(rows: &[MySqlRow]) -> Result<ResultSet, DbError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    let Some(first) = rows.first() else {
        return Ok(result_set);
    };

    let column_names: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let col_count = column_names.len();
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(mysql_extract_value(&row.try_get_raw(i)?)?);
        }
        result_set.add_row_values(row_values);
    }
    Ok(result_set)
}

/// Run a read statement on the pool and return every row.
///
/// # Errors
/// Returns `DbError::MysqlError` on acquisition, execution, or decode failure.
pub async fn execute_select(
    pool: &MySqlPool,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, DbError> {
    let rows = bind_params(sqlx::query(query), params)
        .fetch_all(pool)
        .await?;
    build_result_set(&rows)
}

/// Run a read statement on the pool and return the first row, if any.
///
/// # Errors
/// Returns `DbError::MysqlError` on acquisition, execution, or decode failure.
pub async fn execute_get(
    pool: &MySqlPool,
    query: &str,
    params: &[RowValues],
) -> Result<Option<CustomDbRow>, DbError> {
    let row = bind_params(sqlx::query(query), params)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => Ok(build_result_set(std::slice::from_ref(&row))?.into_first()),
        None => Ok(None),
    }
}

/// Run a write statement on any `MySQL` executor (the pool or an open
/// transaction) and report its identity and change count.
///
/// # Errors
/// Returns `DbError::MysqlError` if execution fails and
/// `DbError::ExecutionError` if the generated id does not fit an `i64`.
pub async fn execute_dml<'c, E>(
    executor: E,
    query: &str,
    params: &[RowValues],
) -> Result<WriteResult, DbError>
where
    E: Executor<'c, Database = MySql>,
{
    let done = bind_params(sqlx::query(query), params)
        .execute(executor)
        .await?;
    let inserted_id = i64::try_from(done.last_insert_id()).map_err(|e| {
        DbError::ExecutionError(format!("Invalid inserted id {}: {e}", done.last_insert_id()))
    })?;
    Ok(WriteResult::new(inserted_id, done.rows_affected()))
}
