use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;

use crate::types::RowValues;

/// Bind `params` onto `query` in order.
#[must_use]
pub fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[RowValues],
) -> Query<'q, MySql, MySqlArguments> {
    for value in params {
        query = match value {
            RowValues::Int(i) => query.bind(*i),
            RowValues::Float(f) => query.bind(*f),
            RowValues::Text(s) => query.bind(s.clone()),
            RowValues::Bool(b) => query.bind(*b),
            RowValues::Timestamp(dt) => query.bind(*dt),
            RowValues::Null => query.bind(None::<String>),
            RowValues::JSON(jval) => query.bind(sqlx::types::Json(jval.clone())),
            RowValues::Blob(bytes) => query.bind(bytes.clone()),
        };
    }
    query
}
