//! Package and relationship persistence.
//!
//! Packages are upserted: an existence pre-check decides between UPDATE
//! and INSERT, so re-running a collection replaces metric columns in
//! place. Relationship inserts rely on the table's UNIQUE constraint for
//! idempotence; the resulting constraint violation on re-insert is
//! swallowed. Any other per-row error is logged and the row skipped.

use crate::ecosystem::Ecosystem;
use crate::error::Result;
use rusqlite::{Connection, Statement, params};
use tracing::warn;

/// One computed row for `<distro>_packages`.
#[derive(Debug, Clone)]
pub struct PackageRow {
    pub package: String,
    pub depends_count: i64,
    pub description: String,
    pub homepage: String,
    pub page_rank: f64,
    pub version: String,
    /// Canonical GitHub link when the homepage points there; the upstream
    /// enricher joins on this.
    pub git_link: Option<String>,
}

pub fn upsert_packages(
    conn: &Connection,
    ecosystem: Ecosystem,
    rows: &[PackageRow],
) -> Result<usize> {
    let table = ecosystem.packages_table();
    let mut exists = conn.prepare(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE package = ?1)"
    ))?;
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {table} (package, depends_count, description, homepage, page_rank, version, git_link) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    ))?;
    let mut update = conn.prepare(&format!(
        "UPDATE {table} SET depends_count = ?1, description = ?2, homepage = ?3, \
         page_rank = ?4, version = ?5, git_link = ?6 WHERE package = ?7"
    ))?;

    let mut written = 0;
    for row in rows {
        match upsert_one(&mut exists, &mut insert, &mut update, row) {
            Ok(()) => written += 1,
            Err(e) => warn!(package = %row.package, error = %e, "failed to persist package"),
        }
    }
    Ok(written)
}

fn upsert_one(
    exists: &mut Statement<'_>,
    insert: &mut Statement<'_>,
    update: &mut Statement<'_>,
    row: &PackageRow,
) -> rusqlite::Result<()> {
    let present: bool = exists.query_row(params![row.package], |r| r.get(0))?;
    if present {
        update.execute(params![
            row.depends_count,
            row.description,
            row.homepage,
            row.page_rank,
            row.version,
            row.git_link,
            row.package,
        ])?;
    } else {
        insert.execute(params![
            row.package,
            row.depends_count,
            row.description,
            row.homepage,
            row.page_rank,
            row.version,
            row.git_link,
        ])?;
    }
    Ok(())
}

/// Insert the edge set. Returns the number of newly inserted rows;
/// re-inserting an existing edge is a no-op.
pub fn insert_relationships(
    conn: &Connection,
    ecosystem: Ecosystem,
    edges: &[(&str, &str)],
) -> Result<usize> {
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {} (frompackage, topackage) VALUES (?1, ?2)",
        ecosystem.relationships_table()
    ))?;

    let mut inserted = 0;
    for (from, to) in edges {
        match insert.execute(params![from, to]) {
            Ok(_) => inserted += 1,
            // Idempotent re-insert: the UNIQUE(frompackage, topackage)
            // constraint already holds this edge.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation => {}
            Err(e) => warn!(%from, %to, error = %e, "failed to insert relationship"),
        }
    }
    Ok(inserted)
}
