//! SQLite backend for the Gambit revision store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The revision log and the pointer table
//! are written only through transaction-scoped helpers, and every facade
//! operation that touches both runs as a single transaction.

mod encode;
mod pointer_table;
mod revision_log;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
