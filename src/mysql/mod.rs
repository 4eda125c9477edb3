// MySQL module - the networked backend
//
// - config: pool construction from the resolved backend configuration
// - params: binding RowValues onto sqlx queries
// - query: row decoding, result building and the read/write verbs
// - transaction: statement sequencing on one leased connection

pub mod config;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::connect_pool;
pub use params::bind_params;
pub use query::{build_result_set, execute_dml, execute_get, execute_select};
pub use transaction::run_transaction;
