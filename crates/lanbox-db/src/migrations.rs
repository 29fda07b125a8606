use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Creates the three collections. No indices, no uniqueness constraints:
/// duplicate usernames and filenames are allowed.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT,
            password    TEXT
        );

        CREATE TABLE IF NOT EXISTS files (
            id              TEXT PRIMARY KEY,
            filename        TEXT NOT NULL,
            data            BLOB NOT NULL,
            content_type    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chat_messages (
            id      TEXT PRIMARY KEY,
            user    TEXT NOT NULL,
            text    TEXT NOT NULL
        );
        ",
    )?;

    info!("Store migrations complete");
    Ok(())
}
