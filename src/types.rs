//! Core data types for the upload/processing workflow

use crate::config::OutputFormat;
use crate::error::{BgRemovalError, Result};
use image::DynamicImage;
use std::path::Path;
use uuid::Uuid;

/// Maximum accepted upload size in bytes (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Media types accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    WebP,
}

impl MediaType {
    /// Parse a declared MIME type
    ///
    /// # Errors
    /// - `UnsupportedFormat` for anything other than JPEG, PNG, or WebP
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::WebP),
            other => Err(BgRemovalError::unsupported_format(other)),
        }
    }

    /// Parse a file extension (without the dot)
    ///
    /// # Errors
    /// - `UnsupportedFormat` for anything other than jpg/jpeg, png, or webp
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            other => Err(BgRemovalError::unsupported_format(other)),
        }
    }

    /// The canonical MIME type string
    #[must_use]
    pub fn as_mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_mime())
    }
}

/// A user-supplied file before validation
///
/// Carries only what the file-acquisition contract provides: a name, a
/// declared media type, and the raw bytes. Validation happens in
/// [`crate::session::RemovalSession::accept_upload`].
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Original file name, used for download naming
    pub file_name: String,
    /// Declared MIME type (not sniffed from content)
    pub declared_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    /// Create a candidate from its parts
    pub fn new<N: Into<String>, T: Into<String>>(
        file_name: N,
        declared_type: T,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Declared size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The currently active user-supplied image
///
/// Single slot per session: replaced wholesale on a new upload, dropped on
/// reset. The `id` tags outbound processing requests so a late response for a
/// superseded image can be recognized and discarded.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    id: Uuid,
    file_name: String,
    media_type: MediaType,
    bytes: Vec<u8>,
}

impl UploadedImage {
    pub(crate) fn new(file_name: String, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name,
            media_type,
            bytes,
        }
    }

    /// Unique identity of this upload slot occupancy
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Original file name
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Validated media type
    #[must_use]
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Raw file contents
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File name without its final extension, used for download naming
    #[must_use]
    pub fn base_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.file_name)
    }

    /// Decode a displayable preview of the original image
    ///
    /// # Errors
    /// - The file contents are not a decodable image
    pub fn preview(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }
}

/// The background-removed image returned by the remote service
///
/// Tied to the [`UploadedImage`] it was computed for via `source_id`;
/// invalidated whenever that upload is replaced or the session is reset.
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    bytes: Vec<u8>,
    format: OutputFormat,
    source_id: Uuid,
}

impl ProcessedResult {
    pub(crate) fn new(bytes: Vec<u8>, format: OutputFormat, source_id: Uuid) -> Self {
        Self {
            bytes,
            format,
            source_id,
        }
    }

    /// Raw processed image bytes as returned by the service
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Output format the result was requested in
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Identity of the upload this result was computed for
    #[must_use]
    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    /// Decode the result for display
    ///
    /// # Errors
    /// - The payload is not a decodable image
    pub fn to_image(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }

    /// Write the result bytes to `path`
    ///
    /// # Errors
    /// - File system errors while writing
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)
            .map_err(|e| BgRemovalError::file_io_error("write processed result", path, &e))
    }
}
