//! SQLite-backed persistence.
//!
//! One connection is opened per persistence pass and dropped when the pass
//! ends; nothing holds a process-wide handle.

pub mod migrate;
pub mod persist;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open (or create) the database file named by the config.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

/// In-memory database for tests.
pub fn open_in_memory() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}
