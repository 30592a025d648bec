//! Mood board application core: accounts, the image editor, the saved-image
//! gallery, boards and their canvas layout, plus the state and navigation
//! model a front end drives.

pub mod auth;
pub mod boards;
pub mod canvas;
pub mod config;
pub mod dialog;
pub mod editor;
pub mod gallery;
pub mod notify;
pub mod state;

use std::sync::Mutex;

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use moodboard_types::{MoodboardError, Result};

pub use auth::Session;
pub use canvas::{Canvas, DragState, EntryId};
pub use config::Config;
pub use dialog::{Choice, Dialogs};
pub use notify::{Level, Notification};
pub use state::{AppState, Page};

static LAST_STAMP: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);

/// Current time at the precision the store keeps, strictly increasing across
/// calls so records written back to back still order by recency.
pub(crate) fn now() -> DateTime<Utc> {
    let current = Utc::now().trunc_subsecs(6);
    let mut last = LAST_STAMP.lock().unwrap_or_else(|e| e.into_inner());
    let stamp = match *last {
        Some(prev) if current <= prev => prev + TimeDelta::microseconds(1),
        _ => current,
    };
    *last = Some(stamp);
    stamp
}

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
pub(crate) fn format_stamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_stamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MoodboardError::Store(anyhow!("Malformed timestamp {:?}: {}", s, e)))
}

pub(crate) fn parse_id(s: &str) -> Result<uuid::Uuid> {
    s.parse()
        .map_err(|e| MoodboardError::Store(anyhow!("Malformed id {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_round_trip_at_microsecond_precision() {
        let t = now();
        let s = format_stamp(&t);
        assert!(s.ends_with('Z'));
        assert_eq!(parse_stamp(&s).unwrap(), t);
    }

    #[test]
    fn stamps_sort_lexically() {
        let a = format_stamp(&"2026-01-01T09:00:00.5Z".parse().unwrap());
        let b = format_stamp(&"2026-01-01T10:00:00Z".parse().unwrap());
        assert!(a < b);
    }

    #[test]
    fn now_is_strictly_increasing() {
        let stamps: Vec<_> = (0..100).map(|_| now()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn garbage_stamp_is_store_error() {
        assert!(matches!(parse_stamp("yesterday"), Err(MoodboardError::Store(_))));
    }
}
