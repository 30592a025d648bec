//! In-memory layout of an open board.
//!
//! Entries keep two orders. Insertion order is what gets saved; stacking
//! order decides which entry is on top and changes whenever an entry is
//! grabbed. Only insertion order survives a save/load cycle.

use std::path::Path;

use moodboard_types::models::PlacedImage;
use tracing::warn;

/// Where the first image lands; each later one is shifted by `STAGGER_STEP`
/// on both axes.
pub const STAGGER_ORIGIN: f64 = 40.0;
pub const STAGGER_STEP: f64 = 10.0;

/// Process-local handle for an entry on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        entry: EntryId,
        /// Pointer position relative to the entry's top-left at grab time.
        grab_offset: (f64, f64),
    },
}

#[derive(Debug, Clone)]
pub struct Canvas {
    entries: Vec<(EntryId, PlacedImage)>,
    /// Bottom to top.
    stack: Vec<EntryId>,
    next_id: u64,
    drag: DragState,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stack: Vec::new(),
            next_id: 0,
            drag: DragState::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn get(&self, id: EntryId) -> Option<&PlacedImage> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, placed)| placed)
    }

    /// Entries bottom to top, the order to draw them in.
    pub fn stacked(&self) -> impl Iterator<Item = (EntryId, &PlacedImage)> {
        self.stack
            .iter()
            .filter_map(|id| self.get(*id).map(|placed| (*id, placed)))
    }

    /// Position the next added image will get.
    pub fn default_position(&self) -> (f64, f64) {
        let offset = STAGGER_ORIGIN + STAGGER_STEP * self.entries.len() as f64;
        (offset, offset)
    }

    /// Add an image at the next staggered position, on top of everything.
    pub fn add_image(&mut self, path: impl Into<String>, w: u32, h: u32) -> EntryId {
        let (x, y) = self.default_position();
        self.push(PlacedImage {
            path: path.into(),
            x,
            y,
            w,
            h,
        })
    }

    fn push(&mut self, placed: PlacedImage) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, placed));
        self.stack.push(id);
        id
    }

    /// Topmost entry whose box contains the point. Edges count as inside.
    pub fn hit_test(&self, px: f64, py: f64) -> Option<EntryId> {
        self.stack.iter().rev().copied().find(|id| {
            self.get(*id).is_some_and(|p| {
                px >= p.x && px <= p.x + f64::from(p.w) && py >= p.y && py <= p.y + f64::from(p.h)
            })
        })
    }

    /// Move an entry to the top of the stack.
    pub fn raise(&mut self, id: EntryId) {
        if let Some(pos) = self.stack.iter().position(|e| *e == id) {
            self.stack.remove(pos);
            self.stack.push(id);
        }
    }

    /// Grab whatever is under the pointer. A miss leaves the canvas idle.
    pub fn begin_drag(&mut self, px: f64, py: f64) -> Option<EntryId> {
        let Some(id) = self.hit_test(px, py) else {
            self.drag = DragState::Idle;
            return None;
        };
        let placed = self.get(id)?;
        let grab_offset = (px - placed.x, py - placed.y);

        self.raise(id);
        self.drag = DragState::Dragging {
            entry: id,
            grab_offset,
        };
        Some(id)
    }

    /// Follow the pointer with the grabbed entry. Returns its new top-left,
    /// or `None` when nothing is being dragged.
    pub fn update_drag(&mut self, px: f64, py: f64) -> Option<(f64, f64)> {
        let DragState::Dragging { entry, grab_offset } = self.drag else {
            return None;
        };
        let placed = self
            .entries
            .iter_mut()
            .find(|(id, _)| *id == entry)
            .map(|(_, placed)| placed)?;

        placed.x = px - grab_offset.0;
        placed.y = py - grab_offset.1;
        Some((placed.x, placed.y))
    }

    /// Drop the grabbed entry where it is.
    pub fn end_drag(&mut self) -> Option<EntryId> {
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Dragging { entry, .. } => Some(entry),
            DragState::Idle => None,
        }
    }

    /// Layout in insertion order.
    pub fn serialize(&self) -> Vec<PlacedImage> {
        self.entries.iter().map(|(_, placed)| placed.clone()).collect()
    }

    /// Rebuild a canvas from a stored layout, skipping entries whose file is
    /// gone. Returns the canvas and how many entries were skipped.
    pub fn deserialize(layout: Vec<PlacedImage>) -> (Self, usize) {
        let mut canvas = Self::new();
        let mut skipped = 0;

        for placed in layout {
            if !Path::new(&placed.path).is_file() {
                warn!("Skipping layout entry with missing file {}", placed.path);
                skipped += 1;
                continue;
            }
            canvas.push(placed);
        }

        (canvas, skipped)
    }
}
