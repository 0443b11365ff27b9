//! Error types shared across Ken Burns editor crates.

use std::path::PathBuf;

/// Top-level error type for editor, interpolation, and export operations.
#[derive(Debug, thiserror::Error)]
pub enum KenBurnsError {
    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Pointer is outside the display surface")]
    PointerOutsideSurface,

    #[error("Invalid box activation: {name:?} (expected \"start\" or \"end\")")]
    InvalidBoxActivation { name: String },

    #[error("Degenerate rectangle: {width}x{height}")]
    DegenerateRectangle { width: u32, height: u32 },

    #[error("Both start and end boxes must be drawn first")]
    SelectionIncomplete,

    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Unreadable image {path}: {message}")]
    UnreadableImage { path: PathBuf, message: String },

    #[error("Encoder error: {message}")]
    Encoder { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using KenBurnsError.
pub type KenBurnsResult<T> = Result<T, KenBurnsError>;

impl KenBurnsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: msg.into(),
        }
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn unreadable_image(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::UnreadableImage {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Whether the error comes from ordinary pointer interaction and
    /// should simply suppress the current update.
    pub fn is_interaction_noise(&self) -> bool {
        matches!(self, Self::PointerOutsideSurface)
    }
}
