use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use tracing::info;

use moodboard_db::Database;
use moodboard_types::models::{User, validate_username};
use moodboard_types::{MoodboardError, Result};

use crate::{format_stamp, now, parse_stamp};

/// The signed-in user. Only one exists per process.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub username: String,
    pub started_at: DateTime<Utc>,
}

pub fn register(db: &Database, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(MoodboardError::missing("username"));
    }
    if password.is_empty() {
        return Err(MoodboardError::missing("password"));
    }
    validate_username(username)?;

    // Check if username is taken
    if db.get_user_by_username(username)?.is_some() {
        return Err(MoodboardError::already_exists(format!("user '{}'", username)));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MoodboardError::Store(anyhow!("Password hashing failed: {}", e)))?
        .to_string();

    // The unique key still catches a writer that slipped in after the check.
    if !db.create_user(username, &password_hash, &format_stamp(&now()))? {
        return Err(MoodboardError::already_exists(format!("user '{}'", username)));
    }

    info!("Registered user {}", username);
    Ok(())
}

/// Unknown user and wrong password fail identically.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<Session> {
    let username = username.trim();
    if username.is_empty() {
        return Err(MoodboardError::missing("username"));
    }
    if password.is_empty() {
        return Err(MoodboardError::missing("password"));
    }

    let user = db
        .get_user_by_username(username)?
        .ok_or(MoodboardError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| MoodboardError::Store(anyhow!("Stored hash for {} is corrupt: {}", username, e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| MoodboardError::Unauthorized)?;

    info!("User {} logged in", user.username);
    Ok(Session {
        username: user.username,
        started_at: now(),
    })
}

pub fn profile(db: &Database, username: &str) -> Result<User> {
    let row = db
        .get_user_by_username(username)?
        .ok_or_else(|| MoodboardError::not_found(format!("user '{}'", username)))?;

    Ok(User {
        username: row.username,
        created_at: parse_stamp(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_authenticate() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "alice", "correct horse").unwrap();

        let session = authenticate(&db, "alice", "correct horse").unwrap();
        assert_eq!(session.username, "alice");
    }

    #[test]
    fn each_hash_gets_its_own_salt() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "alice", "same password").unwrap();
        register(&db, "bob", "same password").unwrap();

        let a = db.get_user_by_username("alice").unwrap().unwrap().password_hash;
        let b = db.get_user_by_username("bob").unwrap().unwrap().password_hash;
        assert_ne!(a, b);
        assert!(authenticate(&db, "bob", "same password").is_ok());
    }

    #[test]
    fn password_is_never_stored_in_plaintext() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "alice", "correct horse").unwrap();

        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert!(!row.password_hash.contains("correct horse"));
        assert!(row.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn duplicate_registration_keeps_first_hash() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "alice", "first").unwrap();
        let before = db.get_user_by_username("alice").unwrap().unwrap().password_hash;

        let err = register(&db, "alice", "second").unwrap_err();
        assert!(matches!(err, MoodboardError::AlreadyExists(_)));

        let after = db.get_user_by_username("alice").unwrap().unwrap().password_hash;
        assert_eq!(before, after);
        assert!(authenticate(&db, "alice", "first").is_ok());
        assert!(authenticate(&db, "alice", "second").is_err());
    }

    #[test]
    fn username_is_trimmed() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "  bob ", "pw").unwrap();
        assert!(authenticate(&db, "bob", "pw").is_ok());
        assert!(matches!(
            register(&db, "bob", "pw"),
            Err(MoodboardError::AlreadyExists(_))
        ));
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "alice", "secret").unwrap();

        let wrong = authenticate(&db, "alice", "guess").unwrap_err();
        let missing = authenticate(&db, "mallory", "secret").unwrap_err();
        assert!(matches!(wrong, MoodboardError::Unauthorized));
        assert!(matches!(missing, MoodboardError::Unauthorized));
        assert_eq!(wrong.to_string(), missing.to_string());
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(register(&db, "   ", "pw"), Err(MoodboardError::Validation(_))));
        assert!(matches!(register(&db, "carol", ""), Err(MoodboardError::Validation(_))));
        assert!(matches!(authenticate(&db, "", "pw"), Err(MoodboardError::Validation(_))));
    }

    #[test]
    fn unsafe_usernames_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(register(&db, "../root", "pw"), Err(MoodboardError::Validation(_))));
    }

    #[test]
    fn profile_reports_creation_date() {
        let db = Database::open_in_memory().unwrap();
        let before = now();
        register(&db, "alice", "pw").unwrap();

        let user = profile(&db, "alice").unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.created_at >= before);
        assert!(matches!(profile(&db, "nobody"), Err(MoodboardError::NotFound(_))));
    }
}
