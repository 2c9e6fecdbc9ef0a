use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Result, TaggerError};

// ── Data Model ──────────────────────────────────────────────────────────────

/// A point on the original image's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPoint {
    pub x: i32,
    pub y: i32,
}

impl ModelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance rounded to the nearest integer.
    pub fn rounded_distance(&self, other: ModelPoint) -> u32 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy).round() as u32
    }
}

/// A circle mark, stored in model-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub center: ModelPoint,
    pub radius: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: [u8; 3],
    pub thickness: u32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            thickness: 2,
        }
    }
}

// ── Annotation Model ────────────────────────────────────────────────────────

/// Per-image annotation state.
///
/// `base` is never touched after load; every frame is composited from it, so
/// popping a circle off `committed` leaves no trace in the next render.
#[derive(Debug, Clone)]
pub struct AnnotationModel {
    base: RgbaImage,
    has_alpha: bool,
    committed: Vec<Annotation>,
    pending: Option<Annotation>,
    style: StrokeStyle,
}

impl AnnotationModel {
    pub fn new(base: DynamicImage, style: StrokeStyle) -> Self {
        Self {
            has_alpha: base.color().has_alpha(),
            base: base.to_rgba8(),
            committed: Vec::new(),
            pending: None,
            style,
        }
    }

    pub fn open(path: &Path, style: StrokeStyle) -> Result<Self> {
        let img = image::open(path).map_err(|source| TaggerError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(img, style))
    }

    pub fn committed(&self) -> &[Annotation] {
        &self.committed
    }

    pub fn pending(&self) -> Option<&Annotation> {
        self.pending.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns false (and changes nothing) if a drag is already active.
    pub fn begin_drag(&mut self, center: ModelPoint) -> bool {
        if self.pending.is_some() {
            log::debug!("ignoring drag start at {center:?}: drag already active");
            return false;
        }
        self.pending = Some(Annotation { center, radius: 0 });
        true
    }

    pub fn update_drag(&mut self, current: ModelPoint) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.radius = pending.center.rounded_distance(current);
                true
            }
            None => false,
        }
    }

    pub fn commit_drag(&mut self, release: ModelPoint) -> Option<Annotation> {
        let mut done = self.pending.take()?;
        done.radius = done.center.rounded_distance(release);
        self.committed.push(done);
        Some(done)
    }

    pub fn undo(&mut self) -> Option<Annotation> {
        self.committed.pop()
    }

    /// Base image with every committed circle, then the pending one, drawn on top.
    pub fn render(&self) -> RgbaImage {
        let mut img = self.base.clone();
        for ann in self.committed.iter().chain(self.pending.iter()) {
            draw_circle_on_image(&mut img, ann, self.style);
        }
        img
    }

    /// `render()` in the pixel layout the file was loaded with.
    pub fn render_for_export(&self) -> DynamicImage {
        let rendered = DynamicImage::ImageRgba8(self.render());
        if self.has_alpha {
            rendered
        } else {
            DynamicImage::ImageRgb8(rendered.to_rgb8())
        }
    }
}

// ── Rasterization ───────────────────────────────────────────────────────────

/// Draws an unfilled circle outline. A pixel is on the outline when its distance
/// from the centre is within `thickness / 2` of the radius; off-image pixels are clipped.
pub fn draw_circle_on_image(img: &mut RgbaImage, ann: &Annotation, style: StrokeStyle) {
    let half_t = f64::from(style.thickness.max(1)) / 2.0;
    let radius = f64::from(ann.radius);
    let outer = radius + half_t;
    let inner = (radius - half_t).max(0.0);
    let reach = outer.floor() as i64;
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let (cx, cy) = (i64::from(ann.center.x), i64::from(ann.center.y));
    let color = Rgba([style.color[0], style.color[1], style.color[2], 255]);

    for dy in -reach..=reach {
        let py = cy + dy;
        if py < 0 || py >= h {
            continue;
        }
        let dy2 = (dy * dy) as f64;
        let x_max = (outer * outer - dy2).max(0.0).sqrt().floor() as i64;
        // Everything strictly inside the inner edge is skipped.
        let x_min = ((inner * inner - dy2).max(0.0).sqrt().floor() as i64 - 1).max(0);

        for dx in x_min..=x_max {
            let dist = ((dx * dx) as f64 + dy2).sqrt();
            if (dist - radius).abs() > half_t {
                continue;
            }
            for px in [cx - dx, cx + dx] {
                if px >= 0 && px < w {
                    img.put_pixel(px as u32, py as u32, color);
                }
                if dx == 0 {
                    break;
                }
            }
        }
    }
}
