use std::path::Path;

use image::RgbaImage;
use tracing::{debug, warn};

use moodboard_db::Database;
use moodboard_db::models::ImageRow;
use moodboard_imaging::ImageStore;
use moodboard_imaging::thumbnail::{GALLERY_TILE, PREVIEW};
use moodboard_types::models::{FilterSettings, SavedImage};
use moodboard_types::{MoodboardError, Result};

use crate::{format_stamp, parse_id, parse_stamp};

/// A saved image ready to show as a gallery tile.
pub struct GalleryTile {
    pub image: SavedImage,
    pub label: String,
    pub thumbnail: RgbaImage,
}

pub fn insert(db: &Database, image: &SavedImage) -> Result<()> {
    db.insert_image(&to_row(image))?;
    Ok(())
}

/// Every record the owner has, newest first, whether or not the file is
/// still on disk.
pub fn list_records(db: &Database, owner: &str) -> Result<Vec<SavedImage>> {
    db.list_images_by_owner(owner)?
        .into_iter()
        .map(from_row)
        .collect()
}

/// The owner's saved images whose files still exist, newest first.
pub fn list(db: &Database, owner: &str) -> Result<Vec<SavedImage>> {
    let images = list_records(db, owner)?
        .into_iter()
        .filter(|img| {
            let present = Path::new(&img.stored_path).is_file();
            if !present {
                debug!("Gallery skipping missing file {}", img.stored_path);
            }
            present
        })
        .collect();
    Ok(images)
}

/// Gallery tiles with thumbnails. Files that can no longer be read are left
/// out rather than failing the whole listing.
pub fn tiles(db: &Database, store: &ImageStore, owner: &str) -> Result<Vec<GalleryTile>> {
    let mut tiles = Vec::new();
    for image in list(db, owner)? {
        let path = Path::new(&image.stored_path);
        match store.load_thumbnail(path, GALLERY_TILE.0, GALLERY_TILE.1) {
            Ok(thumbnail) => {
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| image.stored_path.clone());
                tiles.push(GalleryTile {
                    image,
                    label,
                    thumbnail,
                });
            }
            Err(e) => warn!("Gallery skipping unreadable {}: {}", image.stored_path, e),
        }
    }
    Ok(tiles)
}

pub fn preview(store: &ImageStore, stored_path: &str) -> Result<RgbaImage> {
    store.load_thumbnail(Path::new(stored_path), PREVIEW.0, PREVIEW.1)
}

/// Remove the record, then the file. The record is the source of truth, so a
/// file that refuses to go is only logged.
pub fn delete(db: &Database, store: &ImageStore, owner: &str, stored_path: &str) -> Result<()> {
    if db.delete_image(owner, stored_path)? == 0 {
        return Err(MoodboardError::not_found(format!("saved image {}", stored_path)));
    }

    if let Err(e) = store.delete(Path::new(stored_path)) {
        warn!("Could not delete stored file {}: {}", stored_path, e);
    }
    Ok(())
}

fn to_row(image: &SavedImage) -> ImageRow {
    ImageRow {
        id: image.id.to_string(),
        owner_username: image.owner_username.clone(),
        original_filename: image.original_filename.clone(),
        stored_path: image.stored_path.clone(),
        grayscale: image.filters.grayscale,
        blur: f64::from(image.filters.blur),
        brightness: f64::from(image.filters.brightness),
        contrast: f64::from(image.filters.contrast),
        saved_at: format_stamp(&image.saved_at),
    }
}

fn from_row(row: ImageRow) -> Result<SavedImage> {
    Ok(SavedImage {
        id: parse_id(&row.id)?,
        owner_username: row.owner_username,
        original_filename: row.original_filename,
        stored_path: row.stored_path,
        filters: FilterSettings {
            grayscale: row.grayscale,
            blur: row.blur as f32,
            brightness: row.brightness as f32,
            contrast: row.contrast as f32,
        },
        saved_at: parse_stamp(&row.saved_at)?,
    })
}
