//! Core error types for the Smear compositor.

use std::path::PathBuf;

/// A specialized Result type for Smear operations.
pub type SmearResult<T> = Result<T, SmearError>;

/// Top-level error type encompassing all Smear subsystems.
#[derive(Debug, thiserror::Error)]
pub enum SmearError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("allocation error: cannot create {width}x{height} surface: {message}")]
    Allocation {
        width: u32,
        height: u32,
        message: String,
    },

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl SmearError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SmearError::Configuration(message.into())
    }

    /// Create a surface allocation error for the given size.
    pub fn allocation(width: u32, height: u32, message: impl Into<String>) -> Self {
        SmearError::Allocation {
            width,
            height,
            message: message.into(),
        }
    }

    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SmearError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Whether this error came from the backend failing to create a surface.
    pub fn is_allocation(&self) -> bool {
        matches!(self, SmearError::Allocation { .. })
    }
}
