// git_metrics synchronization against the package tables. These tests
// arrange the link sets so no upstream lookups are needed.

use critscore::depsdev::DepsDevClient;
use critscore::{enrich, store};
use rusqlite::Connection;
use std::path::Path;

fn migrated_db() -> Connection {
    let conn = store::open_in_memory().unwrap();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrations = store::migrate::scan(&dir).unwrap();
    store::migrate::apply(&conn, &migrations).unwrap();
    conn
}

#[tokio::test]
async fn stale_links_deleted_live_links_kept() {
    let conn = migrated_db();
    conn.execute(
        "INSERT INTO alpine_packages (package, git_link) VALUES ('a', 'https://github.com/O/R')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO git_metrics (git_link, depsdev_count) VALUES ('https://github.com/O/R', 5)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO git_metrics (git_link, depsdev_count) VALUES ('https://github.com/Old/Gone', 1)",
        [],
    )
    .unwrap();

    let client = DepsDevClient::new().unwrap();
    let report = enrich::sync_git_metrics(&conn, &client).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.inserted, 0);

    let (remaining, count): (String, i64) = conn
        .query_row("SELECT git_link, depsdev_count FROM git_metrics", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(remaining, "https://github.com/O/R");
    assert_eq!(count, 5, "sync must not clobber existing counts");
}

#[tokio::test]
async fn package_links_canonicalized_before_diff() {
    let conn = migrated_db();
    // The .git variant in a package table matches the canonical row.
    conn.execute(
        "INSERT INTO debian_packages (package, git_link) VALUES ('a', 'https://github.com/O/R.git')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO git_metrics (git_link, depsdev_count) VALUES ('https://github.com/O/R', 2)",
        [],
    )
    .unwrap();

    let client = DepsDevClient::new().unwrap();
    let report = enrich::sync_git_metrics(&conn, &client).await.unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.inserted, 0);
}
