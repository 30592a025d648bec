use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Utc};
use image::{ImageFormat, RgbaImage};
use moodboard_types::models::validate_username;
use moodboard_types::{MoodboardError, Result};
use tracing::{info, warn};

use crate::{map_image_error, open_rgba, thumbnail};

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S%6f";
const MAX_NAME_ATTEMPTS: usize = 16;

/// On-disk storage for edited images.
///
/// Each owner gets a directory under the root. Files are PNG and named
/// `{utc timestamp}_{sanitized original stem}.png`; the returned path is the
/// durable identifier stored in image and board records.
pub struct ImageStore {
    root: PathBuf,
    last_stamp: Mutex<Option<NaiveDateTime>>,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        info!("Image storage directory: {}", root.display());
        Ok(Self {
            root,
            last_stamp: Mutex::new(None),
        })
    }

    pub fn owner_dir(&self, owner: &str) -> PathBuf {
        self.root.join(owner)
    }

    /// Encode `image` losslessly into the owner's directory.
    pub fn store(&self, image: &RgbaImage, owner: &str, original_filename: &str) -> Result<PathBuf> {
        validate_username(owner)?;

        let dir = self.owner_dir(owner);
        fs::create_dir_all(&dir)?;

        let base = sanitize_base_name(original_filename);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let stamp = self.next_stamp();
            let path = dir.join(format!("{}_{}.png", stamp.format(STAMP_FORMAT), base));

            let file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                // Another process got there first; take the next tick.
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            let mut writer = BufWriter::new(file);
            let written = image
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(map_image_error)
                .and_then(|()| writer.flush().map_err(MoodboardError::from));
            if let Err(e) = written {
                drop(writer);
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!("Could not remove partial file {}: {}", path.display(), cleanup);
                }
                return Err(e);
            }

            info!("Stored image for {} at {}", owner, path.display());
            return Ok(path);
        }

        Err(MoodboardError::already_exists(format!(
            "a free file name in {}",
            dir.display()
        )))
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub fn delete(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted stored image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Stored image {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a stored image back and scale it into the given box.
    pub fn load_thumbnail(&self, path: &Path, max_width: u32, max_height: u32) -> Result<RgbaImage> {
        let img = open_rgba(path)?;
        Ok(thumbnail(&img, max_width, max_height))
    }

    /// Microsecond UTC stamp, strictly greater than any handed out before by
    /// this store.
    fn next_stamp(&self) -> NaiveDateTime {
        let now = Utc::now().naive_utc().trunc_subsecs(6);
        let mut last = self.last_stamp.lock().unwrap_or_else(|e| e.into_inner());
        let stamp = match *last {
            Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

/// Stem of `original` with anything outside `[A-Za-z0-9._-]` replaced.
pub fn sanitize_base_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
