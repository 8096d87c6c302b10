pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

/// Open the booking database and bring its schema up to date. The process
/// holds a single connection; handlers share it behind a mutex.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("failed to open database at {path}"))?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}
