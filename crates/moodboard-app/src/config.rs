use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_URI: &str = ".";
pub const DEFAULT_DB_NAME: &str = "moodboard_db";
pub const UPLOAD_ROOT: &str = "uploads";

/// URI that selects a private in-memory database.
pub const IN_MEMORY_URI: &str = ":memory:";

/// Start-up configuration. Read once; nothing re-reads the environment later.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that holds the database file, or `:memory:`.
    pub db_uri: String,
    /// Database file stem.
    pub db_name: String,
    pub upload_root: PathBuf,
}

impl Config {
    /// Load `.env` if present, then read `MOODBOARD_DB_URI` and
    /// `MOODBOARD_DB_NAME`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let db_uri = env::var("MOODBOARD_DB_URI")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URI.into());
        let db_name = env::var("MOODBOARD_DB_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_NAME.into());

        Self {
            db_uri,
            db_name,
            upload_root: PathBuf::from(UPLOAD_ROOT),
        }
    }

    /// Path of the database file, `None` for an in-memory database.
    pub fn db_path(&self) -> Option<PathBuf> {
        if self.db_uri == IN_MEMORY_URI {
            return None;
        }
        Some(PathBuf::from(&self.db_uri).join(format!("{}.sqlite3", self.db_name)))
    }
}
