//! User settings, read from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::StrokeStyle;

const APP_DIR: &str = "circle-tagger";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RGB colour of circle outlines
    pub stroke_color: [u8; 3],
    /// Outline width in image pixels
    pub stroke_thickness: u32,
    /// Initial window size in logical points
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        let stroke = StrokeStyle::default();
        Self {
            stroke_color: stroke.color,
            stroke_thickness: stroke.thickness,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&data)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn stroke(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.stroke_color,
            thickness: self.stroke_thickness.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "stroke_color": [255, 0, 0] }"#).unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.stroke_color, [255, 0, 0]);
        assert_eq!(settings.stroke_thickness, 2);
        assert_eq!(settings.window_size, [1200.0, 800.0]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("nope.json").as_path())).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "stroke_color = red").unwrap();
        let err = Settings::load(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }

    #[test]
    fn test_zero_thickness_clamped() {
        let settings = Settings {
            stroke_thickness: 0,
            ..Settings::default()
        };
        assert_eq!(settings.stroke().thickness, 1);
        assert_eq!(Settings::default().stroke(), StrokeStyle::default());
    }
}
