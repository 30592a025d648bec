use thiserror::Error;

/// Every failure a user action can end in.
///
/// The presentation layer turns each of these into a notification; none of
/// them are meant to take the process down.
#[derive(Debug, Error)]
pub enum MoodboardError {
    /// A required field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Bad credentials. Carries no detail about which part was wrong.
    #[error("invalid username or password")]
    Unauthorized,

    /// An action that needs a session was attempted without one.
    #[error("log in first")]
    LoginRequired,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding failure reported by the imaging library.
    #[error("image error: {0}")]
    Image(String),

    /// Connection or query failure in the backing store.
    #[error("database error: {0}")]
    Store(#[from] anyhow::Error),
}

impl MoodboardError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing(field: &str) -> Self {
        Self::Validation(format!("{} is required", field))
    }

    pub fn not_found<T: Into<String>>(what: T) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists<T: Into<String>>(what: T) -> Self {
        Self::AlreadyExists(what.into())
    }

    pub fn image<T: Into<String>>(msg: T) -> Self {
        Self::Image(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MoodboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message() {
        let err = MoodboardError::missing("username");
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn unauthorized_does_not_leak_detail() {
        assert_eq!(
            MoodboardError::Unauthorized.to_string(),
            "invalid username or password"
        );
    }

    #[test]
    fn missing_session_is_not_a_credential_error() {
        assert_eq!(MoodboardError::LoginRequired.to_string(), "log in first");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: MoodboardError = io.into();
        assert!(matches!(err, MoodboardError::Io(_)));
    }
}
