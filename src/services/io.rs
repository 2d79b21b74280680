//! File acquisition and result saving service
//!
//! Separates file system access from workflow logic. Reading a candidate
//! checks the size limit against file metadata before touching the contents,
//! so an oversized file is refused without being read into memory.

use crate::error::{BgRemovalError, Result};
use crate::types::{MediaType, ProcessedResult, UploadCandidate, MAX_FILE_SIZE};
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Read an upload candidate from a file path
    ///
    /// The declared media type is taken from the file extension, matching the
    /// file-acquisition contract where the type is declared, not sniffed.
    ///
    /// # Errors
    /// - `UnsupportedFormat` when the extension is not jpg/jpeg, png, or webp
    /// - `FileTooLarge` when the file metadata reports more than 10 MiB
    /// - File system errors while reading
    ///
    /// # Examples
    /// ```rust,no_run
    /// use eraseease::services::ImageIOService;
    ///
    /// let candidate = ImageIOService::load_candidate("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_candidate<P: AsRef<Path>>(path: P) -> Result<UploadCandidate> {
        let path_ref = path.as_ref();

        let extension = path_ref
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| BgRemovalError::unsupported_format("file has no extension"))?;
        let media_type = MediaType::from_extension(extension)?;

        let metadata = std::fs::metadata(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("read file metadata", path_ref, &e))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(BgRemovalError::FileTooLarge {
                size: metadata.len(),
                limit: MAX_FILE_SIZE,
            });
        }

        let bytes = std::fs::read(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("read image file", path_ref, &e))?;

        let file_name = path_ref
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(UploadCandidate::new(file_name, media_type.as_mime(), bytes))
    }

    /// Save a processed result to a file
    ///
    /// Creates missing parent directories.
    ///
    /// # Errors
    /// - File system errors while creating directories or writing
    pub fn save_result<P: AsRef<Path>>(result: &ProcessedResult, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BgRemovalError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        result.save(path_ref)
    }
}
