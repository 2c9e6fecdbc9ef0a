use std::path::PathBuf;

use crate::error::{Result, TaggerError};
use crate::image_set::ImageSet;
use crate::model::StrokeStyle;
use crate::session::{DrawSession, DrawState, PointerEvent, PointerOutcome};

const HELP_TEXT: &str = "Click to set the center, and drag to draw a circle.";

// ── Key Dispatch ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    ZoomIn,
    ZoomOut,
    Undo,
    SaveAs,
    Help,
    Quit,
}

impl Command {
    /// Fixed key table. Letters match in either case.
    pub fn from_key(key: Key) -> Option<Self> {
        let c = match key {
            Key::Escape => return Some(Command::Quit),
            Key::Char(c) => c.to_ascii_lowercase(),
        };
        let cmd = match c {
            'n' => Command::Next,
            'p' => Command::Previous,
            '+' | '=' => Command::ZoomIn,
            '-' | '_' => Command::ZoomOut,
            'u' => Command::Undo,
            'r' => Command::SaveAs,
            'c' => Command::Help,
            'q' => Command::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// The shell should ask for a file name and call [`SessionController::save_as`].
    OpenSavePrompt,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    AtBoundary,
    /// Every image in that direction failed to load.
    NothingLoadable,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

// ── Session Controller ──────────────────────────────────────────────────────

/// Owns the image list and the session for the image on screen.
pub struct SessionController {
    images: ImageSet,
    index: usize,
    session: DrawSession,
    style: StrokeStyle,
    status: String,
}

impl SessionController {
    /// Activates the first image that decodes.
    pub fn new(images: ImageSet, style: StrokeStyle) -> Result<Self> {
        let mut failures = Vec::new();
        for index in 0..images.len() {
            let Some(path) = images.get(index) else {
                break;
            };
            match DrawSession::open(path, style) {
                Ok(session) => {
                    let mut controller = Self {
                        images,
                        index,
                        session,
                        style,
                        status: String::new(),
                    };
                    for err in failures {
                        controller.report_error(&err);
                    }
                    controller.announce_image();
                    return Ok(controller);
                }
                Err(err) => failures.push(err),
            }
        }
        for err in &failures {
            log::warn!("{err}");
        }
        Err(TaggerError::NoDecodableImages {
            folder: images.folder().to_path_buf(),
        })
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DrawSession {
        &mut self.session
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        log::info!("{}", self.status);
    }

    fn report_error(&mut self, err: &TaggerError) {
        self.status = err.to_string();
        log::warn!("{}", self.status);
    }

    fn announce_image(&mut self) {
        let name = self
            .session
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.set_status(format!(
            "Opened {name} ({}/{})",
            self.index + 1,
            self.images.len()
        ));
    }

    fn announce_count(&mut self) {
        let n = self.session.model().committed().len();
        self.set_status(format!("Circles: {n}"));
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match Command::from_key(key) {
            Some(cmd) => self.apply(cmd),
            None => KeyOutcome::Ignored,
        }
    }

    pub fn apply(&mut self, cmd: Command) -> KeyOutcome {
        match cmd {
            Command::Next => {
                self.next();
            }
            Command::Previous => {
                self.previous();
            }
            Command::ZoomIn => {
                self.session.zoom_in();
            }
            Command::ZoomOut => {
                self.session.zoom_out();
            }
            Command::Undo => {
                if self.session.undo().is_some() {
                    self.announce_count();
                }
            }
            Command::SaveAs => {
                if self.session.state() == DrawState::Dragging {
                    return KeyOutcome::Ignored;
                }
                return KeyOutcome::OpenSavePrompt;
            }
            Command::Help => self.set_status(HELP_TEXT),
            Command::Quit => return KeyOutcome::Quit,
        }
        KeyOutcome::Handled
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let outcome = self.session.handle_pointer(event);
        if let PointerOutcome::Committed(_) = outcome {
            self.announce_count();
        }
        outcome
    }

    pub fn next(&mut self) -> Navigation {
        self.step(Direction::Forward)
    }

    pub fn previous(&mut self) -> Navigation {
        self.step(Direction::Backward)
    }

    fn step(&mut self, direction: Direction) -> Navigation {
        let advance = |images: &ImageSet, i: usize| match direction {
            Direction::Forward => images.next_index(i),
            Direction::Backward => images.previous_index(i),
        };

        let Some(mut candidate) = advance(&self.images, self.index) else {
            return Navigation::AtBoundary;
        };
        loop {
            let Some(path) = self.images.get(candidate) else {
                return Navigation::NothingLoadable;
            };
            match DrawSession::open(path, self.style) {
                Ok(session) => {
                    if !self.session.model().committed().is_empty() {
                        log::debug!(
                            "discarding {} unsaved circles on {}",
                            self.session.model().committed().len(),
                            self.session.path().display()
                        );
                    }
                    self.session = session;
                    self.index = candidate;
                    self.announce_image();
                    return Navigation::Moved(candidate);
                }
                Err(err) => self.report_error(&err),
            }
            match advance(&self.images, candidate) {
                Some(i) => candidate = i,
                None => return Navigation::NothingLoadable,
            }
        }
    }

    /// Saves the current image under `name` (empty keeps the original stem).
    pub fn save_as(&mut self, name: &str) -> Result<PathBuf> {
        match self.session.save_as(name) {
            Ok(path) => {
                self.set_status(format!("Image saved as {}", path.display()));
                Ok(path)
            }
            Err(err) => {
                self.report_error(&err);
                Err(err)
            }
        }
    }
}
