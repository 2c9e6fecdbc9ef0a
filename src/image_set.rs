//! Ordered collection of the raster files found in one folder.

use std::path::{Path, PathBuf};

use crate::error::{Result, TaggerError};

/// Extensions accepted when scanning a folder, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// Lexicographically sorted image paths. Never empty, never mutated after construction.
#[derive(Debug, Clone)]
pub struct ImageSet {
    folder: PathBuf,
    paths: Vec<PathBuf>,
}

impl ImageSet {
    /// Scan `folder` (non-recursive) for files with a supported extension.
    pub fn scan(folder: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(folder).map_err(|source| TaggerError::FolderUnreadable {
            folder: folder.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| TaggerError::FolderUnreadable {
                folder: folder.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && is_supported(&path) {
                paths.push(path);
            }
        }

        Self::from_paths(folder, paths)
    }

    pub fn from_paths(folder: &Path, mut paths: Vec<PathBuf>) -> Result<Self> {
        if paths.is_empty() {
            return Err(TaggerError::EmptyCollection {
                folder: folder.to_path_buf(),
            });
        }
        paths.sort();
        log::debug!("found {} images in {}", paths.len(), folder.display());
        Ok(Self {
            folder: folder.to_path_buf(),
            paths,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn last_index(&self) -> usize {
        self.paths.len() - 1
    }

    /// Index after `index`, or `None` at the end of the set.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        (index < self.last_index()).then(|| index + 1)
    }

    /// Index before `index`, or `None` at the start of the set.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        index.checked_sub(1)
    }
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.Tiff", "d.gif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("e.png")).unwrap();

        let set = ImageSet::scan(dir.path()).unwrap();
        let names: Vec<_> = (0..set.len())
            .map(|i| set.get(i).unwrap().file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.Tiff"]);
    }

    #[test]
    fn test_scan_empty_folder_is_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), b"x").unwrap();
        let err = ImageSet::scan(dir.path()).unwrap_err();
        assert!(matches!(err, TaggerError::EmptyCollection { .. }));
    }

    #[test]
    fn test_scan_missing_folder_is_error() {
        let dir = tempdir().unwrap();
        let err = ImageSet::scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TaggerError::FolderUnreadable { .. }));
    }

    #[test]
    fn test_navigation_bounds() {
        let set = ImageSet::from_paths(
            Path::new("."),
            vec![PathBuf::from("b.png"), PathBuf::from("a.png")],
        )
        .unwrap();
        assert_eq!(set.get(0), Some(Path::new("a.png")));
        assert_eq!(set.next_index(0), Some(1));
        assert_eq!(set.next_index(1), None);
        assert_eq!(set.previous_index(1), Some(0));
        assert_eq!(set.previous_index(0), None);
    }

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(is_supported(Path::new("x.JPEG")));
        assert!(is_supported(Path::new("x.bmp")));
        assert!(!is_supported(Path::new("x.webp")));
        assert!(!is_supported(Path::new("png")));
    }
}
