//! # birdbone-storage
//!
//! SQLite persistence for the compression loop's cycle history. Every
//! table is append-only at the database level: triggers abort any UPDATE
//! or DELETE. Schema versions are tracked with `PRAGMA user_version`.

pub mod cycle_log;
pub mod migrations;
pub mod pragmas;
pub mod queries;

pub use cycle_log::SqliteCycleLog;

use birdbone_core::errors::{BirdboneError, StorageError};

/// Helper to convert a SQLite error message into a `BirdboneError`.
pub fn to_storage_err(msg: String) -> BirdboneError {
    BirdboneError::Storage(StorageError::SqliteError { message: msg })
}

pub(crate) fn to_serde_err(e: serde_json::Error) -> BirdboneError {
    BirdboneError::Storage(StorageError::Serialization {
        message: e.to_string(),
    })
}
