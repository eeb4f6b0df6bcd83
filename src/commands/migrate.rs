use crate::config::Config;
use crate::error::Result;
use crate::store::{self, migrate};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

pub fn migrate(config_path: &Path, dir: &Path, yes: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let migrations = migrate::scan(dir)?;
    if migrations.is_empty() {
        println!("No migrations found in {}", dir.display());
        return Ok(());
    }

    println!("{}", "Found migrations:".bold());
    for m in &migrations {
        println!("  {} ({}) in `{}`", m.version, m.name, m.path.display());
    }

    let conn = store::open(Path::new(&config.database))?;
    let last = migrate::last_applied(&conn);
    match &last {
        Some(version) => println!("Last migration version: {version}"),
        None => println!("No migration history found, the migration will set up the database."),
    }

    let Some(pending) = migrate::pending(&migrations, last.as_deref()) else {
        println!(
            "{} Recorded version is not present in {}; check the migration files.",
            "✗".red(),
            dir.display()
        );
        return Ok(());
    };
    if pending.is_empty() {
        println!("Database is up to date, no migration needed.");
        return Ok(());
    }

    println!("{}", "Following migrations will be applied:".bold());
    for m in pending {
        println!("  {} ({})", m.version, m.name);
    }

    if !yes && !confirm()? {
        println!("Migration cancelled");
        return Ok(());
    }

    let applied = migrate::apply(&conn, pending)?;
    println!("{} {} migration(s) applied", "✓".green(), applied);
    Ok(())
}

fn confirm() -> Result<bool> {
    print!("Do you want to continue? (y/n): ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim() == "y")
}
