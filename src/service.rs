//! The seam between the workflow controller and the remote service
//!
//! The session never talks to the network directly; it builds a
//! [`ProcessingRequest`] and hands it to a [`BackgroundRemover`]. The real
//! implementation lives in [`crate::backends::removebg`], tests use the mock
//! in [`crate::backends::test_utils`].

use crate::config::{OutputFormat, SizeMode};
use crate::error::Result;
use crate::types::UploadedImage;
use async_trait::async_trait;
use uuid::Uuid;

/// A single outbound background-removal request
///
/// Snapshot of everything the remote call needs, tagged with the identity of
/// the upload it was built from so a late response can be matched against the
/// current slot.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    /// Identity of the upload this request targets
    pub upload_id: Uuid,
    /// Original file name (forwarded as the multipart file name)
    pub file_name: String,
    /// Raw image bytes
    pub image_bytes: Vec<u8>,
    /// Requested size mode (`full` or `auto`)
    pub size_mode: SizeMode,
    /// Requested output format
    pub output_format: OutputFormat,
}

impl ProcessingRequest {
    /// Build a request for `upload` with the given wire options
    #[must_use]
    pub fn for_upload(
        upload: &UploadedImage,
        size_mode: SizeMode,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            upload_id: upload.id(),
            file_name: upload.file_name().to_string(),
            image_bytes: upload.bytes().to_vec(),
            size_mode,
            output_format,
        }
    }
}

/// Remote background-removal service abstraction
///
/// Implementations perform exactly one attempt per call; retry policy is
/// deliberately out of scope.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Remove the background from the image carried by `request`
    ///
    /// Returns the binary processed image on success.
    ///
    /// # Errors
    /// - `QuotaExhausted` when the service reports depleted credits
    /// - `RemoteProcessing` for any other service-side rejection
    /// - `Network` for transport failures
    async fn remove_background(&self, request: &ProcessingRequest) -> Result<Vec<u8>>;
}
