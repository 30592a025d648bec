use std::path::Path;

use anyhow::anyhow;
use tracing::{info, warn};
use uuid::Uuid;

use moodboard_db::Database;
use moodboard_db::models::BoardRow;
use moodboard_imaging::open_rgba;
use moodboard_imaging::thumbnail::{BOARD_PLACEMENT, fit_within};
use moodboard_types::models::{Board, PlacedImage};
use moodboard_types::{MoodboardError, Result};

use crate::canvas::{Canvas, EntryId};
use crate::{format_stamp, now, parse_id, parse_stamp};

/// A board loaded into the canvas for editing.
#[derive(Debug, Clone)]
pub struct OpenBoard {
    pub id: Uuid,
    pub name: String,
    pub canvas: Canvas,
}

/// Create an empty board. Names are unique per owner from the start, so a
/// later save can never fold two boards into one.
pub fn create(db: &Database, owner: &str, name: &str) -> Result<Uuid> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MoodboardError::missing("board name"));
    }

    let id = Uuid::new_v4();
    if !db.create_board(&id.to_string(), owner, name, &format_stamp(&now()))? {
        return Err(MoodboardError::already_exists(format!("board '{}'", name)));
    }

    info!("Created board '{}' for {}", name, owner);
    Ok(id)
}

/// The owner's boards, most recently saved first.
pub fn list(db: &Database, owner: &str) -> Result<Vec<Board>> {
    db.list_boards_by_owner(owner)?
        .into_iter()
        .map(from_row)
        .collect()
}

pub fn get(db: &Database, owner: &str, id: Uuid) -> Result<Board> {
    db.get_board(&id.to_string())?
        .map(from_row)
        .transpose()?
        .filter(|board| board.owner_username == owner)
        .ok_or_else(|| MoodboardError::not_found(format!("board {}", id)))
}

pub fn get_by_name(db: &Database, owner: &str, name: &str) -> Result<Board> {
    db.get_board_by_name(owner, name.trim())?
        .map(from_row)
        .transpose()?
        .ok_or_else(|| MoodboardError::not_found(format!("board '{}'", name.trim())))
}

/// Replace the whole layout of `(owner, name)` in one write, creating the
/// board if needed. Returns the board's id.
pub fn upsert_layout(db: &Database, owner: &str, name: &str, layout: &[PlacedImage]) -> Result<Uuid> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MoodboardError::missing("board name"));
    }

    let json = serde_json::to_string(layout)
        .map_err(|e| MoodboardError::Store(anyhow!("Could not encode layout: {}", e)))?;
    let id = db.upsert_board_layout(
        &Uuid::new_v4().to_string(),
        owner,
        name,
        &json,
        &format_stamp(&now()),
    )?;

    info!("Saved board '{}' for {} ({} images)", name, owner, layout.len());
    parse_id(&id)
}

pub fn delete(db: &Database, owner: &str, id: Uuid) -> Result<()> {
    let board = get(db, owner, id)?;
    db.delete_board(&id.to_string())?;
    info!("Deleted board '{}' for {}", board.board_name, owner);
    Ok(())
}

/// Load a board onto a fresh canvas. Returns how many layout entries were
/// dropped because their file no longer exists.
pub fn open(db: &Database, owner: &str, id: Uuid) -> Result<(OpenBoard, usize)> {
    let board = get(db, owner, id)?;
    let (canvas, skipped) = Canvas::deserialize(board.layout);
    if skipped > 0 {
        warn!("Board '{}' has {} missing images", board.board_name, skipped);
    }

    Ok((
        OpenBoard {
            id: board.id,
            name: board.board_name,
            canvas,
        },
        skipped,
    ))
}

pub fn save(db: &Database, owner: &str, board: &mut OpenBoard) -> Result<()> {
    board.id = upsert_layout(db, owner, &board.name, &board.canvas.serialize())?;
    Ok(())
}

/// Put an image file on the board at the next staggered position, sized to
/// fit the placement box.
pub fn place_image(board: &mut OpenBoard, path: &Path) -> Result<EntryId> {
    let img = open_rgba(path)?;
    let (w, h) = fit_within(img.width(), img.height(), BOARD_PLACEMENT.0, BOARD_PLACEMENT.1);
    let path = path.to_str().ok_or_else(|| {
        MoodboardError::validation(format!("{} is not a UTF-8 path", path.display()))
    })?;

    Ok(board.canvas.add_image(path, w, h))
}

fn from_row(row: BoardRow) -> Result<Board> {
    let layout: Vec<PlacedImage> = serde_json::from_str(&row.layout).map_err(|e| {
        MoodboardError::Store(anyhow!("Board {} has a malformed layout: {}", row.id, e))
    })?;

    Ok(Board {
        id: parse_id(&row.id)?,
        owner_username: row.owner_username,
        board_name: row.board_name,
        layout,
        saved_at: parse_stamp(&row.saved_at)?,
    })
}
