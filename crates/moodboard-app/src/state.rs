//! Application state and the actions a front end triggers.
//!
//! One `AppState` exists per process and is handed to handlers by `&mut`.
//! Actions return `Result<Notification>`; front ends pass them through
//! [`crate::notify::notify`] so every failure ends up as a message.

use std::path::Path;

use image::RgbaImage;
use tracing::info;
use uuid::Uuid;

use moodboard_db::Database;
use moodboard_imaging::ImageStore;
use moodboard_imaging::thumbnail::SELECTION_PREVIEW;
use moodboard_types::models::{Board, FilterSettings, SavedImage, User};
use moodboard_types::{MoodboardError, Result};

use crate::auth::{self, Session};
use crate::boards::{self, OpenBoard};
use crate::canvas::EntryId;
use crate::config::Config;
use crate::dialog::{Choice, Dialogs};
use crate::editor::Editor;
use crate::gallery::{self, GalleryTile};
use crate::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Dashboard,
    Editor,
    Gallery,
    Boards,
    Profile,
}

impl Page {
    pub fn requires_session(self) -> bool {
        !matches!(self, Self::Home | Self::Login)
    }
}

pub struct AppState {
    config: Config,
    db: Database,
    store: ImageStore,
    session: Option<Session>,
    /// Navigation stack; the last element is the current page.
    history: Vec<Page>,
    editor: Editor,
    open_board: Option<OpenBoard>,
}

impl AppState {
    pub fn new(config: Config, db: Database, store: ImageStore) -> Self {
        Self {
            config,
            db,
            store,
            session: None,
            history: vec![Page::Home],
            editor: Editor::new(),
            open_board: None,
        }
    }

    /// Open the database and upload root named by `config`.
    pub fn open(config: Config) -> Result<Self> {
        let db = match config.db_path() {
            Some(path) => Database::open(&path)?,
            None => Database::open_in_memory()?,
        };
        let store = ImageStore::new(config.upload_root.clone())?;
        Ok(Self::new(config, db, store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn open_board(&self) -> Option<&OpenBoard> {
        self.open_board.as_ref()
    }

    // -- Navigation --

    pub fn page(&self) -> Page {
        self.history.last().copied().unwrap_or(Page::Home)
    }

    pub fn navigate(&mut self, page: Page) -> Result<()> {
        if page.requires_session() && self.session.is_none() {
            return Err(MoodboardError::LoginRequired);
        }
        if self.page() != page {
            self.history.push(page);
        }
        Ok(())
    }

    /// Return to the previous page. The first page is never popped.
    pub fn back(&mut self) -> Page {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.page()
    }

    fn reset_history(&mut self, page: Page) {
        self.history.clear();
        self.history.push(page);
    }

    fn current_user(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|s| s.username.as_str())
            .ok_or(MoodboardError::LoginRequired)
    }

    // -- Accounts --

    pub fn register(&mut self, username: &str, password: &str) -> Result<Notification> {
        auth::register(&self.db, username, password)?;
        Ok(Notification::info("Registered", "Account created, please log in."))
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<Notification> {
        let session = auth::authenticate(&self.db, username, password)?;
        let message = format!("Welcome, {}.", session.username);
        self.session = Some(session);
        self.reset_history(Page::Dashboard);
        Ok(Notification::info("Logged in", message))
    }

    pub fn logout(&mut self) -> Notification {
        if let Some(session) = self.session.take() {
            info!("User {} logged out", session.username);
        }
        self.editor.clear();
        self.open_board = None;
        self.reset_history(Page::Login);
        Notification::info("Logged out", "See you next time.")
    }

    pub fn profile(&self) -> Result<User> {
        auth::profile(&self.db, self.current_user()?)
    }

    // -- Editor --

    pub fn upload_image(&mut self, path: &Path) -> Result<Notification> {
        self.current_user()?;
        self.editor.upload(path)?;
        Ok(Notification::info(
            "Loaded",
            format!("{} is ready to edit.", self.editor.original_filename()),
        ))
    }

    pub fn adjust(&mut self, settings: FilterSettings) -> Result<()> {
        self.editor.set_filters(settings)
    }

    pub fn reset_edits(&mut self) {
        self.editor.reset();
    }

    pub fn preview(&self, max_width: u32, max_height: u32) -> Option<RgbaImage> {
        self.editor.preview(max_width, max_height)
    }

    pub fn save_edited(&mut self) -> Result<Notification> {
        let saved = self.editor.save(&self.db, &self.store, self.session.as_ref())?;
        Ok(Notification::info(
            "Saved",
            format!("Edited image saved to {}", saved.stored_path),
        ))
    }

    // -- Gallery --

    pub fn saved_images(&self) -> Result<Vec<SavedImage>> {
        gallery::list(&self.db, self.current_user()?)
    }

    pub fn gallery(&self) -> Result<Vec<GalleryTile>> {
        gallery::tiles(&self.db, &self.store, self.current_user()?)
    }

    pub fn preview_saved(&self, stored_path: &str) -> Result<RgbaImage> {
        self.current_user()?;
        gallery::preview(&self.store, stored_path)
    }

    /// Smaller preview shown while picking an image for a board.
    pub fn selection_preview(&self, stored_path: &str) -> Result<RgbaImage> {
        self.current_user()?;
        self.store
            .load_thumbnail(Path::new(stored_path), SELECTION_PREVIEW.0, SELECTION_PREVIEW.1)
    }

    pub fn delete_saved(&mut self, dialogs: &mut dyn Dialogs, stored_path: &str) -> Result<Notification> {
        let owner = self.current_user()?.to_string();
        if !dialogs.confirm("Confirm", "Delete this image?") {
            return Ok(Notification::cancelled());
        }
        gallery::delete(&self.db, &self.store, &owner, stored_path)?;
        Ok(Notification::info("Deleted", "Image removed."))
    }

    // -- Boards --

    pub fn boards(&self) -> Result<Vec<Board>> {
        boards::list(&self.db, self.current_user()?)
    }

    /// Create a board and make it the open one.
    pub fn create_board(&mut self, name: &str) -> Result<Notification> {
        let owner = self.current_user()?.to_string();
        let id = boards::create(&self.db, &owner, name)?;
        let (board, _) = boards::open(&self.db, &owner, id)?;
        let message = format!("Board '{}' created.", board.name);
        self.open_board = Some(board);
        Ok(Notification::info("Created", message))
    }

    pub fn load_board(&mut self, id: Uuid) -> Result<Notification> {
        let owner = self.current_user()?.to_string();
        let (board, skipped) = boards::open(&self.db, &owner, id)?;

        let mut message = format!("Board '{}' loaded.", board.name);
        if skipped > 0 {
            message.push_str(&format!(" {} missing image(s) were left out.", skipped));
        }
        self.open_board = Some(board);
        Ok(Notification::info("Loaded", message))
    }

    pub fn load_board_by_name(&mut self, name: &str) -> Result<Notification> {
        let board = boards::get_by_name(&self.db, self.current_user()?, name)?;
        self.load_board(board.id)
    }

    /// Pick a board from a list and open it.
    pub fn choose_board(&mut self, dialogs: &mut dyn Dialogs) -> Result<Notification> {
        let boards = self.boards()?;
        if boards.is_empty() {
            return Ok(Notification::info(
                "No boards",
                "You have not created any boards yet.",
            ));
        }

        let names: Vec<String> = boards.iter().map(|b| b.board_name.clone()).collect();
        match dialogs.select("Select a board to load", &names) {
            Choice::Selected(idx) => {
                let board = boards
                    .get(idx)
                    .ok_or_else(|| MoodboardError::not_found("selected board"))?;
                self.load_board(board.id)
            }
            Choice::Cancelled => Ok(Notification::cancelled()),
        }
    }

    pub fn save_board(&mut self) -> Result<Notification> {
        let owner = self.current_user()?.to_string();
        let board = self
            .open_board
            .as_mut()
            .ok_or_else(|| MoodboardError::validation("select or create a board first"))?;
        boards::save(&self.db, &owner, board)?;
        Ok(Notification::info(
            "Saved",
            format!("Board '{}' saved.", board.name),
        ))
    }

    pub fn delete_board(&mut self, dialogs: &mut dyn Dialogs, id: Uuid) -> Result<Notification> {
        let owner = self.current_user()?.to_string();
        let board = boards::get(&self.db, &owner, id)?;
        if !dialogs.confirm("Confirm", &format!("Delete board '{}'?", board.board_name)) {
            return Ok(Notification::cancelled());
        }

        boards::delete(&self.db, &owner, id)?;
        if self.open_board.as_ref().is_some_and(|b| b.id == id) {
            self.open_board = None;
        }
        Ok(Notification::info("Deleted", "Board removed."))
    }

    /// Make sure a board is open, offering to create one if not. `Ok(false)`
    /// means the user backed out.
    fn ensure_board(&mut self, dialogs: &mut dyn Dialogs) -> Result<bool> {
        if self.open_board.is_some() {
            return Ok(true);
        }
        if !dialogs.confirm(
            "No Board",
            "No board selected. Do you want to create a new board now?",
        ) {
            return Ok(false);
        }
        let Some(name) = dialogs.ask_text("New Board", "Enter board name:").selected() else {
            return Ok(false);
        };
        self.create_board(&name)?;
        Ok(true)
    }

    pub fn add_image_from_file(&mut self, dialogs: &mut dyn Dialogs, path: &Path) -> Result<Notification> {
        self.current_user()?;
        if !self.ensure_board(dialogs)? {
            return Ok(Notification::cancelled());
        }
        self.place(path)
    }

    /// Pick one of the user's saved images and put it on the open board.
    pub fn add_image_from_gallery(&mut self, dialogs: &mut dyn Dialogs) -> Result<Notification> {
        let images = self.saved_images()?;
        if images.is_empty() {
            return Ok(Notification::info(
                "No images",
                "No saved images found. Upload in the editor first or choose a file.",
            ));
        }
        if !self.ensure_board(dialogs)? {
            return Ok(Notification::cancelled());
        }

        let labels: Vec<String> = images
            .iter()
            .map(|img| {
                Path::new(&img.stored_path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| img.stored_path.clone())
            })
            .collect();

        match dialogs.select("Select an uploaded image", &labels) {
            Choice::Selected(idx) => {
                let image = images
                    .get(idx)
                    .ok_or_else(|| MoodboardError::not_found("selected image"))?;
                let path = image.stored_path.clone();
                self.place(Path::new(&path))
            }
            Choice::Cancelled => Ok(Notification::cancelled()),
        }
    }

    fn place(&mut self, path: &Path) -> Result<Notification> {
        let board = self
            .open_board
            .as_mut()
            .ok_or_else(|| MoodboardError::validation("select or create a board first"))?;
        boards::place_image(board, path)?;
        Ok(Notification::info(
            "Added",
            format!("{} placed on '{}'.", path.display(), board.name),
        ))
    }

    // -- Canvas gestures --

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<EntryId> {
        self.open_board.as_mut()?.canvas.begin_drag(x, y)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.open_board.as_mut()?.canvas.update_drag(x, y)
    }

    pub fn pointer_up(&mut self) -> Option<EntryId> {
        self.open_board.as_mut()?.canvas.end_drag()
    }
}
