use moodboard_types::MoodboardError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// What the user sees after an action, success or failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::info("Cancelled", "Nothing was changed.")
    }
}

impl From<&MoodboardError> for Notification {
    fn from(err: &MoodboardError) -> Self {
        let message = err.to_string();
        match err {
            MoodboardError::Validation(_) => Self::warning("Invalid", message),
            MoodboardError::AlreadyExists(_) => Self::error("Exists", message),
            MoodboardError::NotFound(_) => Self::error("Not found", message),
            MoodboardError::Unauthorized => Self::error("Unauthorized", message),
            MoodboardError::LoginRequired => Self::warning("Login required", message),
            MoodboardError::Io(_) | MoodboardError::Image(_) => Self::error("Error", message),
            MoodboardError::Store(_) => Self::error("Database error", message),
        }
    }
}

/// Collapse an action's outcome into something to show. Failures are logged
/// and reported, never propagated further.
pub fn notify(result: moodboard_types::Result<Notification>) -> Notification {
    match result {
        Ok(note) => note,
        Err(err) => {
            warn!("Action failed: {}", err);
            Notification::from(&err)
        }
    }
}
