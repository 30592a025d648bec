//! End-to-end: register, edit and save an image, lay it out on a board,
//! save the board, and load it back in a fresh session.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use moodboard_app::config::{Config, IN_MEMORY_URI};
use moodboard_app::notify::{Level, notify};
use moodboard_app::{AppState, Choice, Dialogs, Page};
use moodboard_types::MoodboardError;
use moodboard_types::models::FilterSettings;

/// Always picks the first entry and accepts every prompt.
struct FirstChoice;

impl Dialogs for FirstChoice {
    fn select(&mut self, _title: &str, items: &[String]) -> Choice<usize> {
        if items.is_empty() {
            Choice::Cancelled
        } else {
            Choice::Selected(0)
        }
    }

    fn ask_text(&mut self, _title: &str, _prompt: &str) -> Choice<String> {
        Choice::Cancelled
    }

    fn confirm(&mut self, _title: &str, _question: &str) -> bool {
        true
    }
}

fn config(dir: &Path) -> Config {
    Config {
        db_uri: dir.to_string_lossy().into_owned(),
        db_name: "scenario".into(),
        upload_root: dir.join("uploads"),
    }
}

fn write_source_image(dir: &Path) -> PathBuf {
    let path = dir.join("A.png");
    RgbaImage::from_fn(480, 320, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
    .save(&path)
    .unwrap();
    path
}

#[test]
fn alice_builds_and_reloads_a_board() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source_image(dir.path());

    let mut app = AppState::open(config(dir.path())).unwrap();
    app.register("alice", "hunter2").unwrap();
    app.login("alice", "hunter2").unwrap();
    assert_eq!(app.page(), Page::Dashboard);

    // Editor: upload, grayscale + blur 2.0, save.
    app.navigate(Page::Editor).unwrap();
    app.upload_image(&source).unwrap();
    let settings = FilterSettings {
        grayscale: true,
        blur: 2.0,
        ..FilterSettings::neutral()
    };
    app.adjust(settings).unwrap();
    app.save_edited().unwrap();

    let gallery = app.saved_images().unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].filters, settings);
    assert_eq!(gallery[0].original_filename, "A.png");
    let stored_path = gallery[0].stored_path.clone();

    // Board: create, add from gallery, drag to (120, 80), save.
    app.navigate(Page::Boards).unwrap();
    app.create_board("Moodboard1").unwrap();
    app.add_image_from_gallery(&mut FirstChoice).unwrap();

    // Default position is (40, 40); grab 10px in and drop so the corner lands on (120, 80).
    app.pointer_down(50.0, 50.0).unwrap();
    assert_eq!(app.pointer_move(130.0, 90.0), Some((120.0, 80.0)));
    app.pointer_up().unwrap();
    app.save_board().unwrap();

    app.logout();

    // A new process over the same database sees the same board.
    let mut app = AppState::open(config(dir.path())).unwrap();
    app.login("alice", "hunter2").unwrap();
    let note = notify(app.load_board_by_name("Moodboard1"));
    assert_eq!(note.level, Level::Info);

    let board = app.open_board().unwrap();
    let layout = board.canvas.serialize();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].path, stored_path);
    assert_eq!((layout[0].x, layout[0].y), (120.0, 80.0));
    assert_eq!((layout[0].w, layout[0].h), (300, 200));
    assert_eq!(app.boards().unwrap().len(), 1);
}

#[test]
fn deleted_image_leaves_board_entry_dangling() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source_image(dir.path());

    let mut app = AppState::open(config(dir.path())).unwrap();
    app.register("alice", "pw").unwrap();
    app.login("alice", "pw").unwrap();
    app.upload_image(&source).unwrap();
    app.save_edited().unwrap();

    app.create_board("Dangling").unwrap();
    app.add_image_from_gallery(&mut FirstChoice).unwrap();
    app.add_image_from_file(&mut FirstChoice, &source).unwrap();
    app.save_board().unwrap();

    let stored_path = app.saved_images().unwrap()[0].stored_path.clone();
    app.delete_saved(&mut FirstChoice, &stored_path).unwrap();
    assert!(app.saved_images().unwrap().is_empty());

    let note = notify(app.load_board_by_name("Dangling"));
    assert!(note.message.contains("1 missing image"));
    let layout = app.open_board().unwrap().canvas.serialize();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].path, source.to_string_lossy());
}

#[test]
fn second_registration_fails_and_actions_need_login() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::open(Config {
        db_uri: IN_MEMORY_URI.into(),
        db_name: "unused".into(),
        upload_root: dir.path().join("uploads"),
    })
    .unwrap();

    app.register("alice", "one").unwrap();
    let note = notify(app.register("alice", "two"));
    assert_eq!(note.title, "Exists");

    assert!(matches!(app.boards(), Err(MoodboardError::LoginRequired)));
    assert!(matches!(app.save_edited(), Err(MoodboardError::LoginRequired)));
    assert!(matches!(app.login("alice", "two"), Err(MoodboardError::Unauthorized)));
    assert!(app.login("alice", "one").is_ok());
}
