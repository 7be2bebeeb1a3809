//! Per-operation connection factory shared by the console and scheduler.
//!
//! # Invariants
//! - `Gateway::open` migrates the schema once; `connect` re-checks it cheaply.
//! - No connection outlives the operation that asked for it, so the gateway
//!   can be cloned into any thread without locking.

use super::{open_db, DbResult};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Handle to the assistant database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    path: PathBuf,
}

impl Gateway {
    /// Creates the database file if needed and applies pending migrations.
    ///
    /// # Errors
    /// - Returns `DbError` when the file cannot be opened or migrated. This is
    ///   the only storage failure that aborts process startup.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path)?;
        drop(conn);
        info!(
            "event=gateway_open module=db status=ok path={}",
            path.display()
        );
        Ok(Self { path })
    }

    /// Opens a fresh connection for one operation.
    pub fn connect(&self) -> DbResult<Connection> {
        open_db(&self.path)
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
