//! Line-oriented front end. Each line is one user action; dialogs are
//! answered on the following lines.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use moodboard_app::notify::{Level, notify};
use moodboard_app::{AppState, Choice, Dialogs, Notification, Page};
use moodboard_imaging::thumbnail::PREVIEW;
use moodboard_types::MoodboardError;
use moodboard_types::models::FilterSettings;

const HELP: &str = "\
Accounts:  register <user> <password> | login <user> <password> | logout | profile
Pages:     go <home|login|dashboard|editor|gallery|boards|profile> | back
Editor:    upload <path> | gray <on|off> | blur <0-10> | bright <0.2-2> | contrast <0.2-2>
           reset | preview <out.png> | save
Gallery:   gallery | show <stored path> <out.png> | peek <stored path> <out.png>
           delete-image <stored path>
Boards:    boards | new-board <name> | open-board [name] | add-image [path]
           drag <x1> <y1> <x2> <y2> | layout | save-board | delete-board <name>
Other:     status | help | quit";

pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn run(&mut self, app: &mut AppState) -> anyhow::Result<()> {
        writeln!(self.output, "MoodBoard Maker. Type 'help' for commands.")?;
        loop {
            let prompt = format!("{}> ", page_name(app.page()));
            let Some(line) = self.read_line(&prompt)? else {
                break;
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            let Some((&command, args)) = words.split_first() else {
                continue;
            };
            if command == "quit" || command == "exit" {
                break;
            }
            debug!("Command {}", command);
            self.dispatch(app, command, args)?;
        }
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn show(&mut self, note: Notification) -> io::Result<()> {
        let tag = match note.level {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        writeln!(self.output, "[{}] {}: {}", tag, note.title, note.message)
    }

    fn usage(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "usage: {}", text)
    }

    fn dispatch(&mut self, app: &mut AppState, command: &str, args: &[&str]) -> io::Result<()> {
        match (command, args) {
            ("help", _) => writeln!(self.output, "{}", HELP),
            ("status", _) => self.status(app),

            ("register", [user, password]) => self.show(notify(app.register(user, password))),
            ("register", _) => self.usage("register <user> <password>"),
            ("login", [user, password]) => self.show(notify(app.login(user, password))),
            ("login", _) => self.usage("login <user> <password>"),
            ("logout", _) => self.show(app.logout()),
            ("profile", _) => match app.profile() {
                Ok(user) => writeln!(
                    self.output,
                    "{} (member since {})",
                    user.username,
                    user.created_at.format("%Y-%m-%d")
                ),
                Err(e) => self.show(notify(Err(e))),
            },

            ("go", [name]) => match parse_page(name) {
                Some(page) => match app.navigate(page) {
                    Ok(()) => Ok(()),
                    Err(e) => self.show(notify(Err(e))),
                },
                None => self.usage("go <home|login|dashboard|editor|gallery|boards|profile>"),
            },
            ("go", _) => self.usage("go <page>"),
            ("back", _) => {
                app.back();
                Ok(())
            }

            ("upload", [path]) => self.show(notify(app.upload_image(Path::new(path)))),
            ("upload", _) => self.usage("upload <path>"),
            ("gray", [flag]) => match parse_flag(flag) {
                Some(on) => self.adjust(app, |f| f.grayscale = on),
                None => self.usage("gray <on|off>"),
            },
            ("blur", [value]) => match value.parse::<f32>() {
                Ok(v) => self.adjust(app, |f| f.blur = v),
                Err(_) => self.usage("blur <0-10>"),
            },
            ("bright", [value]) => match value.parse::<f32>() {
                Ok(v) => self.adjust(app, |f| f.brightness = v),
                Err(_) => self.usage("bright <0.2-2>"),
            },
            ("contrast", [value]) => match value.parse::<f32>() {
                Ok(v) => self.adjust(app, |f| f.contrast = v),
                Err(_) => self.usage("contrast <0.2-2>"),
            },
            ("reset", _) => {
                app.reset_edits();
                self.show(Notification::info("Reset", "Filters back to neutral."))
            }
            ("preview", [out]) => match app.preview(PREVIEW.0, PREVIEW.1) {
                Some(img) => self.write_image(&img, out),
                None => self.show(notify(Err(MoodboardError::validation("load an image first")))),
            },
            ("preview", _) => self.usage("preview <out.png>"),
            ("save", _) => self.show(notify(app.save_edited())),

            ("gallery", _) => match app.gallery() {
                Ok(tiles) if tiles.is_empty() => writeln!(self.output, "No saved images."),
                Ok(tiles) => {
                    for tile in tiles {
                        writeln!(
                            self.output,
                            "{}  {}x{}  {}",
                            tile.label,
                            tile.thumbnail.width(),
                            tile.thumbnail.height(),
                            tile.image.stored_path
                        )?;
                    }
                    Ok(())
                }
                Err(e) => self.show(notify(Err(e))),
            },
            ("show", [stored, out]) => match app.preview_saved(stored) {
                Ok(img) => self.write_image(&img, out),
                Err(e) => self.show(notify(Err(e))),
            },
            ("show", _) => self.usage("show <stored path> <out.png>"),
            ("peek", [stored, out]) => match app.selection_preview(stored) {
                Ok(img) => self.write_image(&img, out),
                Err(e) => self.show(notify(Err(e))),
            },
            ("peek", _) => self.usage("peek <stored path> <out.png>"),
            ("delete-image", [stored]) => {
                let result = app.delete_saved(self, stored);
                self.show(notify(result))
            }
            ("delete-image", _) => self.usage("delete-image <stored path>"),

            ("boards", _) => match app.boards() {
                Ok(boards) if boards.is_empty() => writeln!(self.output, "No boards."),
                Ok(boards) => {
                    for board in boards {
                        writeln!(
                            self.output,
                            "{}  ({} images, saved {})",
                            board.board_name,
                            board.layout.len(),
                            board.saved_at.format("%Y-%m-%d %H:%M")
                        )?;
                    }
                    Ok(())
                }
                Err(e) => self.show(notify(Err(e))),
            },
            ("new-board", []) => self.usage("new-board <name>"),
            ("new-board", name) => self.show(notify(app.create_board(&name.join(" ")))),
            ("open-board", []) => {
                let result = app.choose_board(self);
                self.show(notify(result))
            }
            ("open-board", name) => self.show(notify(app.load_board_by_name(&name.join(" ")))),
            ("add-image", []) => {
                let result = app.add_image_from_gallery(self);
                self.show(notify(result))
            }
            ("add-image", [path]) => {
                let result = app.add_image_from_file(self, Path::new(path));
                self.show(notify(result))
            }
            ("add-image", _) => self.usage("add-image [path]"),
            ("drag", [x1, y1, x2, y2]) => {
                let coords: Result<Vec<f64>, _> = [x1, y1, x2, y2].iter().map(|v| v.parse()).collect();
                match coords.as_deref() {
                    Ok(&[x1, y1, x2, y2]) => self.drag(app, (x1, y1), (x2, y2)),
                    _ => self.usage("drag <x1> <y1> <x2> <y2>"),
                }
            }
            ("drag", _) => self.usage("drag <x1> <y1> <x2> <y2>"),
            ("layout", _) => match app.open_board() {
                Some(board) => {
                    writeln!(self.output, "Board '{}':", board.name)?;
                    for (_, placed) in board.canvas.stacked() {
                        writeln!(
                            self.output,
                            "  ({}, {}) {}x{}  {}",
                            placed.x, placed.y, placed.w, placed.h, placed.path
                        )?;
                    }
                    Ok(())
                }
                None => writeln!(self.output, "No board open."),
            },
            ("save-board", _) => self.show(notify(app.save_board())),
            ("delete-board", []) => self.usage("delete-board <name>"),
            ("delete-board", name) => {
                let name = name.join(" ");
                let result = app
                    .boards()
                    .and_then(|boards| {
                        boards
                            .into_iter()
                            .find(|b| b.board_name == name)
                            .ok_or_else(|| MoodboardError::not_found(format!("board '{}'", name)))
                    })
                    .and_then(|board| app.delete_board(self, board.id));
                self.show(notify(result))
            }

            (other, _) => writeln!(self.output, "Unknown command '{}'. Type 'help'.", other),
        }
    }

    fn status(&mut self, app: &AppState) -> io::Result<()> {
        let database = match app.config().db_path() {
            Some(path) => path.display().to_string(),
            None => "in memory".to_string(),
        };
        writeln!(self.output, "database: {}", database)?;
        match app.session() {
            Some(session) => writeln!(
                self.output,
                "user: {} (since {})",
                session.username,
                session.started_at.format("%H:%M:%S")
            )?,
            None => writeln!(self.output, "user: not logged in")?,
        }

        let editor = app.editor();
        match editor.source_path() {
            Some(path) if editor.is_loaded() => {
                let f = editor.filters();
                writeln!(
                    self.output,
                    "editor: {} (gray={} blur={} bright={} contrast={})",
                    path.display(),
                    f.grayscale,
                    f.blur,
                    f.brightness,
                    f.contrast
                )?;
            }
            _ => writeln!(self.output, "editor: empty")?,
        }

        match app.open_board() {
            Some(board) => writeln!(
                self.output,
                "board: {} ({} images)",
                board.name,
                board.canvas.len()
            ),
            None => writeln!(self.output, "board: none"),
        }
    }

    fn adjust(&mut self, app: &mut AppState, change: impl FnOnce(&mut FilterSettings)) -> io::Result<()> {
        let mut settings = app.editor().filters();
        change(&mut settings);
        match app.adjust(settings) {
            Ok(()) => writeln!(
                self.output,
                "gray={} blur={} bright={} contrast={}",
                settings.grayscale, settings.blur, settings.brightness, settings.contrast
            ),
            Err(e) => self.show(notify(Err(e))),
        }
    }

    fn drag(&mut self, app: &mut AppState, from: (f64, f64), to: (f64, f64)) -> io::Result<()> {
        if app.open_board().is_none() {
            return writeln!(self.output, "No board open.");
        }
        if app.pointer_down(from.0, from.1).is_none() {
            return writeln!(self.output, "Nothing at ({}, {}).", from.0, from.1);
        }
        let landed = app.pointer_move(to.0, to.1);
        app.pointer_up();
        match landed {
            Some((x, y)) => writeln!(self.output, "Moved to ({}, {}).", x, y),
            None => Ok(()),
        }
    }

    fn write_image(&mut self, img: &image::RgbaImage, out: &str) -> io::Result<()> {
        match img.save(out) {
            Ok(()) => writeln!(self.output, "Wrote {}x{} to {}", img.width(), img.height(), out),
            Err(e) => self.show(notify(Err(MoodboardError::image(e.to_string())))),
        }
    }
}

impl<R: BufRead, W: Write> Dialogs for Shell<R, W> {
    fn select(&mut self, title: &str, items: &[String]) -> Choice<usize> {
        if writeln!(self.output, "{}", title).is_err() {
            return Choice::Cancelled;
        }
        for (i, item) in items.iter().enumerate() {
            if writeln!(self.output, "  {}) {}", i + 1, item).is_err() {
                return Choice::Cancelled;
            }
        }

        let prompt = format!("number (1-{}, empty to cancel): ", items.len());
        match self.read_line(&prompt) {
            Ok(Some(answer)) => match answer.parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => Choice::Selected(n - 1),
                _ => Choice::Cancelled,
            },
            _ => Choice::Cancelled,
        }
    }

    fn ask_text(&mut self, title: &str, prompt: &str) -> Choice<String> {
        match self.read_line(&format!("{} - {} ", title, prompt)) {
            Ok(Some(answer)) if !answer.is_empty() => Choice::Selected(answer),
            _ => Choice::Cancelled,
        }
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        matches!(
            self.read_line(&format!("{} - {} [y/N] ", title, question)),
            Ok(Some(answer)) if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        )
    }
}

fn page_name(page: Page) -> &'static str {
    match page {
        Page::Home => "home",
        Page::Login => "login",
        Page::Dashboard => "dashboard",
        Page::Editor => "editor",
        Page::Gallery => "gallery",
        Page::Boards => "boards",
        Page::Profile => "profile",
    }
}

fn parse_page(name: &str) -> Option<Page> {
    match name {
        "home" => Some(Page::Home),
        "login" => Some(Page::Login),
        "dashboard" => Some(Page::Dashboard),
        "editor" => Some(Page::Editor),
        "gallery" => Some(Page::Gallery),
        "boards" => Some(Page::Boards),
        "profile" => Some(Page::Profile),
        _ => None,
    }
}

fn parse_flag(flag: &str) -> Option<bool> {
    match flag {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}
