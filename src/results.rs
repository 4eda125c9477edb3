mod result_set;
mod row;
mod write_result;

pub use result_set::ResultSet;
pub use row::CustomDbRow;
pub use write_result::WriteResult;
