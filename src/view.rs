use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::model::ModelPoint;

pub const ZOOM_STEP: f32 = 0.25;
pub const MIN_ZOOM: f32 = 0.25;

/// A point in the displayed, zoom-scaled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Uniform model-to-screen scale. Frames are resampled with nearest-neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl ViewTransform {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Divides by zoom and rounds once, on the final value.
    pub fn to_model(&self, p: ScreenPoint) -> ModelPoint {
        ModelPoint::new(
            (p.x / self.zoom).round() as i32,
            (p.y / self.zoom).round() as i32,
        )
    }

    #[allow(dead_code)]
    pub fn to_screen(&self, p: ModelPoint) -> ScreenPoint {
        ScreenPoint::new(p.x as f32 * self.zoom, p.y as f32 * self.zoom)
    }

    pub fn zoom_in(&mut self) {
        self.zoom += ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn scaled_size(&self, (width, height): (u32, u32)) -> (u32, u32) {
        let scale = |d: u32| ((d as f32 * self.zoom).round() as u32).max(1);
        (scale(width), scale(height))
    }

    pub fn scale(&self, buffer: &RgbaImage) -> RgbaImage {
        let (w, h) = self.scaled_size(buffer.dimensions());
        if (w, h) == buffer.dimensions() {
            return buffer.clone();
        }
        imageops::resize(buffer, w, h, FilterType::Nearest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_zoom_steps_and_floor() {
        let mut view = ViewTransform::default();
        for _ in 0..3 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), 1.75);

        let mut view = ViewTransform::default();
        for _ in 0..8 {
            view.zoom_out();
            assert!(view.zoom() >= MIN_ZOOM);
        }
        assert_eq!(view.zoom(), 0.25);
    }

    #[test]
    fn test_screen_to_model_under_zoom() {
        let mut view = ViewTransform::default();
        for _ in 0..4 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), 2.0);
        assert_eq!(view.to_model(ScreenPoint::new(20.0, 20.0)), ModelPoint::new(10, 10));
        assert_eq!(view.to_screen(ModelPoint::new(10, 10)), ScreenPoint::new(20.0, 20.0));
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let mut zooms = Vec::new();
        let mut view = ViewTransform::default();
        for _ in 0..3 {
            view.zoom_out();
        }
        for _ in 0..20 {
            zooms.push(view);
            view.zoom_in();
        }

        for view in zooms {
            for &(x, y) in &[(0, 0), (1, 7), (13, 250), (999, 3), (-4, 12)] {
                let p = ModelPoint::new(x, y);
                let back = view.to_model(view.to_screen(p));
                assert!((back.x - p.x).abs() <= 1, "zoom {}: {p:?} -> {back:?}", view.zoom());
                assert!((back.y - p.y).abs() <= 1, "zoom {}: {p:?} -> {back:?}", view.zoom());
            }
        }
    }

    #[test]
    fn test_scale_nearest() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        let mut view = ViewTransform::default();
        assert_eq!(view.scale(&img), img);

        for _ in 0..4 {
            view.zoom_in();
        }
        let scaled = view.scale(&img);
        assert_eq!(scaled.dimensions(), (4, 4));
        assert_eq!(*scaled.get_pixel(3, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(*scaled.get_pixel(2, 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*scaled.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_scaled_size_never_zero() {
        let mut view = ViewTransform::default();
        for _ in 0..3 {
            view.zoom_out();
        }
        assert_eq!(view.scaled_size((1, 3)), (1, 1));
        assert_eq!(view.scaled_size((400, 300)), (100, 75));
    }
}
