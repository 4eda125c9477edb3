//! Dual-backend relational data access.
//!
//! One [`Database`] handle serves an application whether it is configured for
//! an embedded `SQLite` file or a pooled `MySQL` server. Statements are written
//! once in the `SQLite` dialect; for `MySQL` they are rewritten on the fly
//! (see [`translation`]).

#[cfg(not(any(feature = "sqlite", feature = "mysql")))]
compile_error!("enable at least one backend feature: `sqlite` or `mysql`");

pub mod prelude;

pub mod callback;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::BackendConfig;
pub use database::Database;
pub use error::DbError;
pub use executor::DatabaseExecutor;
pub use results::{CustomDbRow, ResultSet, WriteResult};
pub use types::{BackendKind, RowValues, Statement};
