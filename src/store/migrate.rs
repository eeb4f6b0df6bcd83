//! Database migration runner.
//!
//! Migrations live in subdirectories named `YYYY_MM_DD_NN_<name>`, each
//! holding a `migration.sql`. They are applied in version order; every
//! applied migration is recorded in `_migrations_history`, and the runner
//! replays only what follows the last recorded version.

use crate::error::Result;
use chrono::Utc;
use regex::Regex;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

static DIR_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}_\d{2}_\d{2}_\d{2})_(.+)$").expect("migration name pattern"));

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: String,
    pub name: String,
    pub path: PathBuf,
}

/// Scan a migrations directory, sorted by version.
pub fn scan(dir: &Path) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let sql_path = entry.path().join("migration.sql");
        if !sql_path.is_file() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let Some(caps) = DIR_NAME_RE.captures(&dir_name) else {
            warn!(directory = %dir_name, "ignoring migration directory with invalid name");
            continue;
        };
        migrations.push(Migration {
            version: caps[1].to_string(),
            name: caps[2].to_string(),
            path: sql_path,
        });
    }
    migrations.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(migrations)
}

/// Last version recorded in `_migrations_history`, or `None` on a fresh
/// database (including one where the history table does not exist yet).
pub fn last_applied(conn: &Connection) -> Option<String> {
    conn.query_row(
        "SELECT version FROM _migrations_history ORDER BY id DESC LIMIT 1",
        [],
        |r| r.get(0),
    )
    .ok()
}

/// Migrations newer than `last`. `None` when `last` is recorded but not
/// present in the scanned set; the directory and the database disagree
/// and nothing should be applied.
pub fn pending<'a>(migrations: &'a [Migration], last: Option<&str>) -> Option<&'a [Migration]> {
    match last {
        None => Some(migrations),
        Some(version) => migrations
            .iter()
            .position(|m| m.version == version)
            .map(|idx| &migrations[idx + 1..]),
    }
}

/// Apply migrations in order, recording each in `_migrations_history`.
pub fn apply(conn: &Connection, migrations: &[Migration]) -> Result<usize> {
    for migration in migrations {
        info!(version = %migration.version, name = %migration.name, "applying migration");
        let sql = std::fs::read_to_string(&migration.path)?;
        conn.execute_batch(&sql)?;
        conn.execute(
            "INSERT INTO _migrations_history (version, name, time) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, Utc::now()],
        )?;
    }
    Ok(migrations.len())
}
