use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MoodboardError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Usernames double as upload directory names, so anything that could
/// escape or alias a directory is refused.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(MoodboardError::missing("username"));
    }
    if username == "." || username == ".." {
        return Err(MoodboardError::validation("username cannot be '.' or '..'"));
    }
    if username
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(MoodboardError::validation(
            "username cannot contain slashes or control characters",
        ));
    }
    Ok(())
}

/// Adjustments applied to an original upload to produce the working image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub grayscale: bool,
    pub blur: f32,
    pub brightness: f32,
    pub contrast: f32,
}

impl FilterSettings {
    pub const BLUR_RANGE: (f32, f32) = (0.0, 10.0);
    pub const ENHANCE_RANGE: (f32, f32) = (0.2, 2.0);

    /// Settings that leave the image untouched.
    pub const fn neutral() -> Self {
        Self {
            grayscale: false,
            blur: 0.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }

    /// Reject values the editor controls can never produce.
    pub fn validate(&self) -> Result<()> {
        check_range("blur", self.blur, Self::BLUR_RANGE)?;
        check_range("brightness", self.brightness, Self::ENHANCE_RANGE)?;
        check_range("contrast", self.contrast, Self::ENHANCE_RANGE)?;
        Ok(())
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::neutral()
    }
}

fn check_range(name: &str, value: f32, (lo, hi): (f32, f32)) -> Result<()> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(MoodboardError::validation(format!(
            "{} must be between {} and {}, got {}",
            name, lo, hi, value
        )));
    }
    Ok(())
}

/// One save from the editor. Saves never overwrite each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedImage {
    pub id: Uuid,
    pub owner_username: String,
    pub original_filename: String,
    pub stored_path: String,
    pub filters: FilterSettings,
    pub saved_at: DateTime<Utc>,
}

/// An image's position and size on a board.
///
/// `x`/`y` are the top-left corner in board coordinates, `w`/`h` the
/// thumbnail size the image was placed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    pub path: String,
    pub x: f64,
    pub y: f64,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub owner_username: String,
    pub board_name: String,
    pub layout: Vec<PlacedImage>,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_that_alias_directories_rejected() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("al.ice-2").is_ok());
        assert!(matches!(validate_username(""), Err(MoodboardError::Validation(_))));
        assert!(validate_username("..").is_err());
        assert!(validate_username("a/b").is_err());
        assert!(validate_username("a\\b").is_err());
        assert!(validate_username("a\nb").is_err());
    }

    #[test]
    fn neutral_is_default() {
        assert_eq!(FilterSettings::default(), FilterSettings::neutral());
        assert!(FilterSettings::neutral().validate().is_ok());
    }

    #[test]
    fn out_of_range_values_rejected() {
        let blur = FilterSettings { blur: 10.5, ..FilterSettings::neutral() };
        assert!(matches!(blur.validate(), Err(MoodboardError::Validation(_))));

        let dark = FilterSettings { brightness: 0.1, ..FilterSettings::neutral() };
        assert!(dark.validate().is_err());

        let nan = FilterSettings { contrast: f32::NAN, ..FilterSettings::neutral() };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let edge = FilterSettings {
            grayscale: true,
            blur: 10.0,
            brightness: 0.2,
            contrast: 2.0,
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn placed_image_json_shape() {
        let placed = PlacedImage {
            path: "uploads/alice/a.png".into(),
            x: 120.0,
            y: 80.0,
            w: 300,
            h: 200,
        };
        let json = serde_json::to_value(&placed).unwrap();
        assert_eq!(json["path"], "uploads/alice/a.png");
        assert_eq!(json["x"], 120.0);
        assert_eq!(json["w"], 300);
    }
}
