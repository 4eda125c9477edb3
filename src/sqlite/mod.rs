// SQLite module - the embedded backend
//
// - config: storage directory creation and opening the single handle
// - connection: the shared handle and blocking-thread dispatch
// - params: RowValues to SQLite value conversion
// - query: result extraction and building
// - executor: the read/write verbs against the handle
// - transaction: literal BEGIN/COMMIT/ROLLBACK sequencing

pub mod config;
pub mod connection;
pub mod executor;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::open_database;
pub use connection::SqliteConnection;
pub use executor::{execute_dml, execute_get, execute_select};
pub use params::Params;
pub use query::build_result_set;
pub use transaction::run_transaction;
