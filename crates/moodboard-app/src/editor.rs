use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{info, warn};
use uuid::Uuid;

use moodboard_db::Database;
use moodboard_imaging::{ImageStore, apply_filters, open_rgba, thumbnail};
use moodboard_types::models::{FilterSettings, SavedImage};
use moodboard_types::{MoodboardError, Result};

use crate::auth::Session;
use crate::{gallery, now};

const UNTITLED: &str = "untitled";

/// The upload being adjusted. The original is kept untouched so every
/// adjustment starts from it.
#[derive(Default)]
pub struct Editor {
    source_path: Option<PathBuf>,
    original: Option<RgbaImage>,
    working: Option<RgbaImage>,
    filters: FilterSettings,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    pub fn filters(&self) -> FilterSettings {
        self.filters
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn working_image(&self) -> Option<&RgbaImage> {
        self.working.as_ref()
    }

    /// Load a new original. Filters go back to neutral.
    pub fn upload(&mut self, path: &Path) -> Result<()> {
        let original = open_rgba(path)?;
        info!(
            "Loaded {} ({}x{}) into the editor",
            path.display(),
            original.width(),
            original.height()
        );

        self.working = Some(original.clone());
        self.original = Some(original);
        self.source_path = Some(path.to_path_buf());
        self.filters = FilterSettings::neutral();
        Ok(())
    }

    /// Re-run the pipeline on the original with new settings.
    pub fn set_filters(&mut self, settings: FilterSettings) -> Result<()> {
        settings.validate()?;
        let original = self.original.as_ref().ok_or_else(no_image)?;

        self.working = Some(apply_filters(original, &settings));
        self.filters = settings;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.filters = FilterSettings::neutral();
        self.working = self.original.clone();
    }

    /// Working image scaled to fit the preview area.
    pub fn preview(&self, max_width: u32, max_height: u32) -> Option<RgbaImage> {
        self.working
            .as_ref()
            .map(|img| thumbnail(img, max_width, max_height))
    }

    /// File name of the upload, `untitled` if there is none.
    pub fn original_filename(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Write the working image to the owner's store and record it.
    ///
    /// The file goes first; a record is only written for a file that exists.
    pub fn save(
        &self,
        db: &Database,
        store: &ImageStore,
        session: Option<&Session>,
    ) -> Result<SavedImage> {
        let session = session.ok_or(MoodboardError::LoginRequired)?;
        let working = self.working.as_ref().ok_or_else(no_image)?;

        let original_filename = self.original_filename();
        let path = store.store(working, &session.username, &original_filename)?;
        let Some(stored_path) = path.to_str().map(str::to_owned) else {
            if let Err(cleanup) = store.delete(&path) {
                warn!("Could not remove unrecordable file {}: {}", path.display(), cleanup);
            }
            return Err(MoodboardError::validation(format!(
                "stored path {} is not valid UTF-8",
                path.display()
            )));
        };

        let record = SavedImage {
            id: Uuid::new_v4(),
            owner_username: session.username.clone(),
            original_filename,
            stored_path,
            filters: self.filters,
            saved_at: now(),
        };

        if let Err(e) = gallery::insert(db, &record) {
            if let Err(cleanup) = store.delete(&path) {
                warn!("Could not remove orphaned file {}: {}", path.display(), cleanup);
            }
            return Err(e);
        }

        info!("Saved {} for {}", record.stored_path, record.owner_username);
        Ok(record)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn no_image() -> MoodboardError {
    MoodboardError::validation("load an image first")
}
