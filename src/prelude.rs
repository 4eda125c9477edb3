//! Convenient imports for common functionality.
//!
//! This module re-exports the types most callers need, so a single
//! `use sql_bridge::prelude::*;` is enough to open a database and run verbs.

pub use crate::config::{BackendConfig, MysqlConfigBuilder, SqliteConfigBuilder};
pub use crate::database::Database;
pub use crate::error::DbError;
pub use crate::executor::DatabaseExecutor;
pub use crate::results::{CustomDbRow, ResultSet, WriteResult};
pub use crate::translation::{Rewritten, rewrite_for_networked};
pub use crate::types::{BackendKind, RowValues, Statement};
