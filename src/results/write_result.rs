use serde::Serialize;

/// Normalized outcome of a write, identical in shape for both backends.
///
/// `inserted_id` is `0` when the statement had no auto-generated identity
/// target (updates, deletes, DDL, ignored inserts, short-circuited control
/// statements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WriteResult {
    /// Identity generated by the statement, or 0
    pub inserted_id: i64,
    /// Number of rows the statement changed
    pub rows_affected: u64,
}

impl WriteResult {
    #[must_use]
    pub fn new(inserted_id: i64, rows_affected: u64) -> Self {
        Self {
            inserted_id,
            rows_affected,
        }
    }

    /// The zero-effect result returned for skipped statements.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}
