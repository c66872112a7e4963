//! Error types for hanover-flipdot.

use thiserror::Error;

/// Main error type for all flip-dot operations.
#[derive(Debug, Error)]
pub enum FlipdotError {
    /// Sign parameters rejected at construction (zero size, oversized image).
    #[error("Invalid sign descriptor: {0}")]
    InvalidDescriptor(String),

    /// A sign with this name is already registered.
    #[error("Sign already exists: {0}")]
    AlreadyExists(String),

    /// Unknown sign name, or an ambiguous empty-name lookup.
    #[error("Sign not found: {0:?}")]
    NotFound(String),

    /// No image was supplied for a draw.
    #[error("Missing image")]
    MissingImage,

    /// Image size does not match the sign size.
    #[error(
        "Image dimensions do not match sign dimensions: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// Image payload could not be framed.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The port accepted fewer bytes than the frame length.
    #[error("Incomplete write: wrote {written} bytes out of {expected}")]
    ShortWrite { written: usize, expected: usize },

    /// I/O error while writing to the port.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Controller configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl FlipdotError {
    /// Whether this error came from the transport rather than from validation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ShortWrite { .. } | Self::Transport(_))
    }
}

/// Result type alias using FlipdotError.
pub type Result<T> = std::result::Result<T, FlipdotError>;
