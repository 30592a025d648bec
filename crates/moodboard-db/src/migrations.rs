use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, images, boards)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                username        TEXT PRIMARY KEY,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE images (
                id                  TEXT PRIMARY KEY,
                owner_username      TEXT NOT NULL,
                original_filename   TEXT NOT NULL,
                stored_path         TEXT NOT NULL,
                grayscale           INTEGER NOT NULL,
                blur                REAL NOT NULL,
                brightness          REAL NOT NULL,
                contrast            REAL NOT NULL,
                saved_at            TEXT NOT NULL
            );

            CREATE INDEX idx_images_owner
                ON images(owner_username, saved_at);

            -- Layout is a JSON array of placed images; the pair below is the
            -- upsert key for saves.
            CREATE TABLE boards (
                id              TEXT PRIMARY KEY,
                owner_username  TEXT NOT NULL,
                board_name      TEXT NOT NULL,
                layout          TEXT NOT NULL DEFAULT '[]',
                saved_at        TEXT NOT NULL,
                UNIQUE(owner_username, board_name)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
