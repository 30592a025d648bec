//! Database row types. These map directly to SQLite rows and stay free of
//! domain types so the persistence layer has no upward dependencies.

pub struct UserRow {
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct ImageRow {
    pub id: String,
    pub owner_username: String,
    pub original_filename: String,
    pub stored_path: String,
    pub grayscale: bool,
    pub blur: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub saved_at: String,
}

pub struct BoardRow {
    pub id: String,
    pub owner_username: String,
    pub board_name: String,
    /// JSON array of placed images.
    pub layout: String,
    pub saved_at: String,
}
