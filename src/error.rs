use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Could not open or decode image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No images found in the folder: {}", folder.display())]
    EmptyCollection { folder: PathBuf },

    #[error("Cannot read folder {}: {source}", folder.display())]
    FolderUnreadable {
        folder: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("None of the images in {} could be decoded", folder.display())]
    NoDecodableImages { folder: PathBuf },

    #[error("A file with that name already exists: {}", path.display())]
    NameCollision { path: PathBuf },

    #[error("Failed to save {}: {reason}", path.display())]
    SaveFailed { path: PathBuf, reason: String },

    #[error("Finish the current circle before saving")]
    NotIdle,
}

pub type Result<T> = std::result::Result<T, TaggerError>;
