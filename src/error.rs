//! Error types for background removal operations

use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Fallback message shown when the remote service fails without a usable reason
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process image. Please try again.";

/// Message shown when the remote service reports exhausted credits
pub const QUOTA_EXHAUSTED_MESSAGE: &str =
    "Today's credits have run out. Please try again tomorrow.";

/// Comprehensive error types for background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding errors for uploads or remote payloads
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Network-level errors while talking to the remote service
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Upload refused: declared media type is not JPEG, PNG, or WebP
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Upload refused: file exceeds the size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Declared size of the rejected file
        size: u64,
        /// Maximum accepted size
        limit: u64,
    },

    /// Processing or downloading was attempted with no image loaded
    #[error("No image loaded")]
    NoImageLoaded,

    /// The remote service reported that the usage allowance is depleted
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The remote service rejected the request for any other reason
    #[error("Remote processing failed: {0}")]
    RemoteProcessing(String),
}

impl BgRemovalError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new remote processing error
    pub fn remote_processing<S: Into<String>>(msg: S) -> Self {
        Self::RemoteProcessing(msg.into())
    }

    /// Create a quota exhaustion error carrying the user-facing quota message
    #[must_use]
    pub fn quota_exhausted() -> Self {
        Self::QuotaExhausted(QUOTA_EXHAUSTED_MESSAGE.to_string())
    }

    /// Create a network error with operation context
    pub fn network_error(operation: &str, error: &reqwest::Error) -> Self {
        Self::Network(format!("{operation}: {error}"))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }

    /// The transient notification text surfaced to the user for this error
    ///
    /// Quota errors keep their dedicated message, upload validation errors
    /// explain the constraint, and everything else falls back to the generic
    /// processing-failure text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::QuotaExhausted(msg) => msg.clone(),
            Self::UnsupportedFormat(_) => {
                "Please upload a supported image format (PNG, JPG, or WebP)".to_string()
            },
            Self::FileTooLarge { .. } => "Image size must be less than 10MB".to_string(),
            Self::NoImageLoaded => "Please upload an image first".to_string(),
            Self::RemoteProcessing(msg) => msg.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
