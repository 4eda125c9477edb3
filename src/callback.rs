use crate::error::DbError;

/// Hand a borrowed view of `result` to `callback`, then return `result`.
///
/// The callback sees exactly what the awaiting caller sees, so both forms
/// of every verb agree.
pub fn complete<T, F>(result: Result<T, DbError>, callback: F) -> Result<T, DbError>
where
    F: FnOnce(Result<&T, &DbError>),
{
    callback(result.as_ref());
    result
}
