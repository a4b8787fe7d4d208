use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image '{source_name}': {source}")]
    Decode {
        source_name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("duplicate image name '{name}' (from '{first}' and '{second}')")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    #[error("canvas {width}x{height} cannot be allocated (limit {limit}px per side)")]
    CanvasAllocation { width: u64, height: u64, limit: u32 },
    #[error("class name '{class_name}' emitted twice")]
    ClassNameConflict { class_name: String },
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SpriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
