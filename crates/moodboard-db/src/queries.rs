use crate::Database;
use crate::models::{BoardRow, ImageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

const IMAGE_COLUMNS: &str = "id, owner_username, original_filename, stored_path, \
     grayscale, blur, brightness, contrast, saved_at";

const BOARD_COLUMNS: &str = "id, owner_username, board_name, layout, saved_at";

impl Database {
    // -- Users --

    /// Insert a user. Returns `false` if the username was already taken,
    /// which can only happen when another writer won the race against the
    /// caller's existence check.
    pub fn create_user(&self, username: &str, password_hash: &str, created_at: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
                (username, password_hash, created_at),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Images --

    pub fn insert_image(&self, image: &ImageRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO images (id, owner_username, original_filename, stored_path,
                                     grayscale, blur, brightness, contrast, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    image.id,
                    image.owner_username,
                    image.original_filename,
                    image.stored_path,
                    image.grayscale,
                    image.blur,
                    image.brightness,
                    image.contrast,
                    image.saved_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Newest first. Ties on the timestamp fall back to insertion order.
    pub fn list_images_by_owner(&self, owner: &str) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM images WHERE owner_username = ?1 ORDER BY saved_at DESC, rowid DESC",
                IMAGE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner], image_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete the owner's record(s) for a stored file. Returns rows removed.
    pub fn delete_image(&self, owner: &str, stored_path: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM images WHERE owner_username = ?1 AND stored_path = ?2",
                (owner, stored_path),
            )?;
            Ok(removed)
        })
    }

    // -- Boards --

    /// Insert an empty board. Returns `false` if the owner already has a
    /// board with that name.
    pub fn create_board(&self, id: &str, owner: &str, name: &str, saved_at: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO boards (id, owner_username, board_name, layout, saved_at)
                 VALUES (?1, ?2, ?3, '[]', ?4)",
                (id, owner, name, saved_at),
            )?;
            Ok(inserted == 1)
        })
    }

    /// Newest first. Ties on the timestamp fall back to insertion order.
    pub fn list_boards_by_owner(&self, owner: &str) -> Result<Vec<BoardRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM boards WHERE owner_username = ?1 ORDER BY saved_at DESC, rowid DESC",
                BOARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner], board_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_board(&self, id: &str) -> Result<Option<BoardRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM boards WHERE id = ?1", BOARD_COLUMNS);
            conn.query_row(&sql, [id], board_from_row).optional()
        })
    }

    pub fn get_board_by_name(&self, owner: &str, name: &str) -> Result<Option<BoardRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM boards WHERE owner_username = ?1 AND board_name = ?2",
                BOARD_COLUMNS
            );
            conn.query_row(&sql, [owner, name], board_from_row).optional()
        })
    }

    /// Replace a board's layout and timestamp in one statement, creating the
    /// board under `new_id` if `(owner, name)` does not exist yet.
    /// Returns the id of the board that was written.
    pub fn upsert_board_layout(
        &self,
        new_id: &str,
        owner: &str,
        name: &str,
        layout: &str,
        saved_at: &str,
    ) -> Result<String> {
        self.with_conn_mut(|conn| {
            let id = conn.query_row(
                "INSERT INTO boards (id, owner_username, board_name, layout, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(owner_username, board_name)
                 DO UPDATE SET layout = excluded.layout, saved_at = excluded.saved_at
                 RETURNING id",
                params![new_id, owner, name, layout, saved_at],
                |row| row.get(0),
            )?;
            Ok(id)
        })
    }

    pub fn delete_board(&self, id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM boards WHERE id = ?1", [id])?;
            Ok(removed)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT username, password_hash, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                username: row.get(0)?,
                password_hash: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        owner_username: row.get(1)?,
        original_filename: row.get(2)?,
        stored_path: row.get(3)?,
        grayscale: row.get(4)?,
        blur: row.get(5)?,
        brightness: row.get(6)?,
        contrast: row.get(7)?,
        saved_at: row.get(8)?,
    })
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<BoardRow> {
    Ok(BoardRow {
        id: row.get(0)?,
        owner_username: row.get(1)?,
        board_name: row.get(2)?,
        layout: row.get(3)?,
        saved_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, owner: &str, path: &str, saved_at: &str) -> ImageRow {
        ImageRow {
            id: id.into(),
            owner_username: owner.into(),
            original_filename: "a.jpg".into(),
            stored_path: path.into(),
            grayscale: true,
            blur: 2.0,
            brightness: 1.0,
            contrast: 1.0,
            saved_at: saved_at.into(),
        }
    }

    #[test]
    fn duplicate_user_is_ignored() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_user("alice", "hash-1", "2026-01-01T00:00:00.000000Z").unwrap());
        assert!(!db.create_user("alice", "hash-2", "2026-01-02T00:00:00.000000Z").unwrap());

        let user = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(user.password_hash, "hash-1");
        assert!(db.get_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn images_listed_newest_first_per_owner() {
        let db = Database::open_in_memory().unwrap();
        db.insert_image(&image("1", "alice", "p1", "2026-01-01T00:00:00.000000Z")).unwrap();
        db.insert_image(&image("2", "alice", "p2", "2026-01-03T00:00:00.000000Z")).unwrap();
        db.insert_image(&image("3", "bob", "p3", "2026-01-04T00:00:00.000000Z")).unwrap();
        db.insert_image(&image("4", "alice", "p4", "2026-01-03T00:00:00.000000Z")).unwrap();

        let ids: Vec<String> = db
            .list_images_by_owner("alice")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["4", "2", "1"]);
    }

    #[test]
    fn image_delete_is_owner_scoped() {
        let db = Database::open_in_memory().unwrap();
        db.insert_image(&image("1", "alice", "shared", "2026-01-01T00:00:00.000000Z")).unwrap();

        assert_eq!(db.delete_image("bob", "shared").unwrap(), 0);
        assert_eq!(db.delete_image("alice", "shared").unwrap(), 1);
        assert!(db.list_images_by_owner("alice").unwrap().is_empty());
    }

    #[test]
    fn board_names_unique_per_owner() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_board("b1", "alice", "Moodboard1", "2026-01-01T00:00:00.000000Z").unwrap());
        assert!(!db.create_board("b2", "alice", "Moodboard1", "2026-01-01T00:00:01.000000Z").unwrap());
        assert!(db.create_board("b3", "bob", "Moodboard1", "2026-01-01T00:00:02.000000Z").unwrap());

        let board = db.get_board_by_name("alice", "Moodboard1").unwrap().unwrap();
        assert_eq!(board.id, "b1");
        assert_eq!(board.layout, "[]");
    }

    #[test]
    fn upsert_overwrites_existing_board() {
        let db = Database::open_in_memory().unwrap();
        db.create_board("b1", "alice", "Moodboard1", "2026-01-01T00:00:00.000000Z").unwrap();

        let first = db
            .upsert_board_layout("x1", "alice", "Moodboard1", "[1]", "2026-01-02T00:00:00.000000Z")
            .unwrap();
        let second = db
            .upsert_board_layout("x2", "alice", "Moodboard1", "[2]", "2026-01-03T00:00:00.000000Z")
            .unwrap();
        assert_eq!(first, "b1");
        assert_eq!(second, "b1");

        let boards = db.list_boards_by_owner("alice").unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].layout, "[2]");
        assert_eq!(boards[0].saved_at, "2026-01-03T00:00:00.000000Z");
    }

    #[test]
    fn upsert_inserts_missing_board() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .upsert_board_layout("fresh", "alice", "New", "[]", "2026-01-01T00:00:00.000000Z")
            .unwrap();
        assert_eq!(id, "fresh");
        assert!(db.get_board("fresh").unwrap().is_some());
    }

    #[test]
    fn delete_board_by_id() {
        let db = Database::open_in_memory().unwrap();
        db.create_board("b1", "alice", "One", "2026-01-01T00:00:00.000000Z").unwrap();
        assert_eq!(db.delete_board("b1").unwrap(), 1);
        assert_eq!(db.delete_board("b1").unwrap(), 0);
        assert!(db.get_board("b1").unwrap().is_none());
    }
}
