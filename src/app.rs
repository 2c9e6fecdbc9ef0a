use eframe::egui;

use crate::config::Settings;
use crate::controller::{Key, KeyOutcome, SessionController};
use crate::error::TaggerError;
use crate::session::PointerEvent;
use crate::view::ScreenPoint;

const APP_NAME: &str = "circle-tagger";

// ── Save Prompt ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct SavePrompt {
    name: String,
    // Focus is grabbed one frame late so the key that opened the prompt is not typed into it.
    armed: bool,
}

enum PromptAction {
    None,
    Submit,
    Cancel,
}

// ── App ─────────────────────────────────────────────────────────────────────

struct TaggerApp {
    controller: SessionController,
    texture: Option<egui::TextureHandle>,
    /// (image index, frame generation) of the uploaded texture
    uploaded: Option<(usize, u64)>,
    prompt: Option<SavePrompt>,
    title: String,
}

impl TaggerApp {
    fn new(controller: SessionController) -> Self {
        Self {
            controller,
            texture: None,
            uploaded: None,
            prompt: None,
            title: String::new(),
        }
    }

    fn window_title(&self) -> String {
        let name = self
            .controller
            .session()
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("Image - {name}")
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.window_title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let key = (
            self.controller.index(),
            self.controller.session().generation(),
        );
        if self.texture.is_some() && self.uploaded == Some(key) {
            return;
        }
        let frame = self.controller.session_mut().frame();
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        match self.texture.as_mut() {
            Some(tex) => tex.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("frame", color_image, egui::TextureOptions::NEAREST));
            }
        }
        self.uploaded = Some(key);
    }

    fn dispatch_keys(&mut self, ctx: &egui::Context) {
        let keys = ctx.input(|i| keys_from_events(&i.events));
        for key in keys {
            match self.controller.handle_key(key) {
                KeyOutcome::Quit => {
                    log::info!("quitting");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    return;
                }
                KeyOutcome::OpenSavePrompt => {
                    self.prompt = Some(SavePrompt::default());
                    return;
                }
                KeyOutcome::Handled | KeyOutcome::Ignored => {}
            }
        }
    }

    fn show_save_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let default_name = self.controller.session().default_name();
        let mut action = PromptAction::None;

        egui::Window::new("Save as")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("New name (default: {default_name})"));
                let te = ui.text_edit_singleline(&mut prompt.name);
                if !prompt.armed {
                    prompt.armed = true;
                    ctx.request_repaint();
                } else if !te.lost_focus() {
                    te.request_focus();
                }
                if te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = PromptAction::Submit;
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    action = PromptAction::Cancel;
                }
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = PromptAction::Submit;
                    }
                    if ui.button("Cancel").clicked() {
                        action = PromptAction::Cancel;
                    }
                });
            });

        match action {
            PromptAction::None => {}
            PromptAction::Cancel => {
                self.prompt = None;
                self.controller.set_status("Save cancelled");
            }
            PromptAction::Submit => {
                let name = prompt.name.clone();
                match self.controller.save_as(&name) {
                    // ask again
                    Err(TaggerError::NameCollision { .. }) => {}
                    Ok(_) | Err(_) => self.prompt = None,
                }
            }
        }
    }

    fn forward_pointer(&mut self, ui: &mut egui::Ui, response: &egui::Response, rect: egui::Rect) {
        let to_screen = |pos: egui::Pos2| {
            let rel = pos - rect.min;
            ScreenPoint::new(rel.x, rel.y)
        };
        let primary = egui::PointerButton::Primary;

        if response.drag_started_by(primary) {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                self.controller
                    .handle_pointer(PointerEvent::Press(to_screen(origin)));
            }
        }
        if response.dragged_by(primary) && response.drag_delta() != egui::Vec2::ZERO {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller
                    .handle_pointer(PointerEvent::Move(to_screen(pos)));
            }
        }
        if response.drag_stopped_by(primary) {
            let pos = response
                .hover_pos()
                .or(ui.input(|i| i.pointer.latest_pos()));
            if let Some(pos) = pos {
                self.controller
                    .handle_pointer(PointerEvent::Release(to_screen(pos)));
            }
        }

        // Pan (middle mouse button)
        if ui.input(|i| i.pointer.middle_down()) {
            let delta = ui.input(|i| i.pointer.delta());
            ui.scroll_with_delta(delta);
        }
    }
}

/// Typed characters and Escape, in arrival order. Modifiers play no part.
fn keys_from_events(events: &[egui::Event]) -> Vec<Key> {
    let mut keys = Vec::new();
    for event in events {
        match event {
            egui::Event::Text(text) => keys.extend(text.chars().map(Key::Char)),
            egui::Event::Key {
                key: egui::Key::Escape,
                pressed: true,
                ..
            } => keys.push(Key::Escape),
            _ => {}
        }
    }
    keys
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for TaggerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.prompt.is_none() {
            self.dispatch_keys(ctx);
        }
        self.sync_title(ctx);

        let images = self.controller.images().len();
        let index = self.controller.index();
        let zoom = self.controller.session().view().zoom();
        let circles = self.controller.session().model().committed().len();
        let drawing = self.controller.session().model().pending().map(|a| a.radius);
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{}/{}", index + 1, images));
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", zoom * 100.0));
                ui.separator();
                ui.label(format!("Circles: {circles}"));
                if let Some(radius) = drawing {
                    ui.label(format!("(drawing r={radius})"));
                }
                ui.separator();
                ui.label("n/p: navigate  +/-: zoom  u: undo  r: save as  esc: quit");
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.controller.status());
        });

        self.show_save_prompt(ctx);
        self.ensure_texture(ctx);

        let Some((tex_id, size)) = self.texture.as_ref().map(|t| (t.id(), t.size_vec2())) else {
            return;
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .drag_to_scroll(false)
                .show(ui, |ui| {
                    let (rect, response) =
                        ui.allocate_exact_size(size, egui::Sense::click_and_drag());
                    ui.painter().image(
                        tex_id,
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                    if self.prompt.is_none() {
                        self.forward_pointer(ui, &response, rect);
                    }
                });
        });
    }
}

pub fn run(controller: SessionController, settings: &Settings) -> anyhow::Result<()> {
    let app = TaggerApp::new(controller);
    let title = app.window_title();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(APP_NAME, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Failed to run eframe: {e}"))
}
