//! Interactive drawing on a single image.
//!
//! A [`DrawSession`] is either idle or dragging; which one is decided by
//! whether its model holds a pending circle. Pointer events arrive in
//! screen-space and are mapped through the view before touching the model.

use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::{Result, TaggerError};
use crate::model::{Annotation, AnnotationModel, StrokeStyle};
use crate::view::{ScreenPoint, ViewTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(ScreenPoint),
    Move(ScreenPoint),
    Release(ScreenPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// The model changed and the frame must be redrawn.
    Redraw,
    /// A circle was finished.
    Committed(Annotation),
    /// Out-of-order event (press while dragging, move or release while idle).
    Ignored,
}

pub struct DrawSession {
    path: PathBuf,
    model: AnnotationModel,
    view: ViewTransform,
    frame: Option<RgbaImage>,
    generation: u64,
}

impl DrawSession {
    pub fn new(path: PathBuf, model: AnnotationModel) -> Self {
        Self {
            path,
            model,
            view: ViewTransform::default(),
            frame: None,
            generation: 0,
        }
    }

    pub fn open(path: &Path, style: StrokeStyle) -> Result<Self> {
        let model = AnnotationModel::open(path, style)?;
        Ok(Self::new(path.to_path_buf(), model))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model(&self) -> &AnnotationModel {
        &self.model
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn state(&self) -> DrawState {
        if self.model.is_dragging() {
            DrawState::Dragging
        } else {
            DrawState::Idle
        }
    }

    /// Bumped every time the displayed frame changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate(&mut self) {
        self.frame = None;
        self.generation += 1;
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let outcome = match (self.state(), event) {
            (DrawState::Idle, PointerEvent::Press(p)) => {
                self.model.begin_drag(self.view.to_model(p));
                PointerOutcome::Redraw
            }
            (DrawState::Dragging, PointerEvent::Move(p)) => {
                self.model.update_drag(self.view.to_model(p));
                PointerOutcome::Redraw
            }
            (DrawState::Dragging, PointerEvent::Release(p)) => {
                match self.model.commit_drag(self.view.to_model(p)) {
                    Some(ann) => PointerOutcome::Committed(ann),
                    None => PointerOutcome::Ignored,
                }
            }
            (state, event) => {
                log::debug!("ignoring {event:?} while {state:?}");
                PointerOutcome::Ignored
            }
        };
        if outcome != PointerOutcome::Ignored {
            self.invalidate();
        }
        outcome
    }

    /// Pops the last committed circle. Ignored while a drag is active.
    pub fn undo(&mut self) -> Option<Annotation> {
        if self.state() == DrawState::Dragging {
            log::debug!("ignoring undo during drag");
            return None;
        }
        let popped = self.model.undo();
        if popped.is_some() {
            self.invalidate();
        }
        popped
    }

    /// Returns false if the zoom change was refused because a drag is active.
    pub fn zoom_in(&mut self) -> bool {
        self.change_zoom(ViewTransform::zoom_in)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.change_zoom(ViewTransform::zoom_out)
    }

    fn change_zoom(&mut self, change: fn(&mut ViewTransform)) -> bool {
        if self.state() == DrawState::Dragging {
            log::debug!("ignoring zoom change during drag");
            return false;
        }
        let before = self.view.zoom();
        change(&mut self.view);
        if self.view.zoom() != before {
            self.invalidate();
        }
        true
    }

    /// Composited frame at the current zoom, rebuilt only after a change.
    pub fn frame(&mut self) -> &RgbaImage {
        let (model, view) = (&self.model, &self.view);
        self.frame
            .get_or_insert_with(|| view.scale(&model.render()))
    }

    pub fn default_name(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string()
    }

    /// Where `save_as(name)` would write: same folder and extension, new stem.
    pub fn target_path(&self, name: &str) -> PathBuf {
        let name = name.trim();
        let stem = if name.is_empty() {
            self.default_name()
        } else {
            name.to_string()
        };
        let file_name = match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        self.path.with_file_name(file_name)
    }

    /// Writes the model-resolution render to a new file. Never overwrites.
    pub fn save_as(&self, name: &str) -> Result<PathBuf> {
        if self.state() == DrawState::Dragging {
            return Err(TaggerError::NotIdle);
        }
        let target = self.target_path(name);
        if target.exists() {
            return Err(TaggerError::NameCollision { path: target });
        }
        let format = ImageFormat::from_path(&target).map_err(|e| TaggerError::SaveFailed {
            path: target.clone(),
            reason: e.to_string(),
        })?;

        let file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(TaggerError::NameCollision { path: target });
            }
            Err(e) => {
                return Err(TaggerError::SaveFailed {
                    path: target,
                    reason: e.to_string(),
                })
            }
        };

        let mut writer = BufWriter::new(file);
        let written = self
            .model
            .render_for_export()
            .write_to(&mut writer, format)
            .map_err(|e| e.to_string())
            .and_then(|()| writer.flush().map_err(|e| e.to_string()));

        if let Err(reason) = written {
            drop(writer);
            if let Err(e) = std::fs::remove_file(&target) {
                log::warn!("could not remove partial file {}: {e}", target.display());
            }
            return Err(TaggerError::SaveFailed { path: target, reason });
        }

        log::info!(
            "saved {} with {} circles",
            target.display(),
            self.model.committed().len()
        );
        Ok(target)
    }
}
