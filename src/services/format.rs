//! Output format handling service

use crate::config::OutputFormat;

/// Suffix inserted between the base name and the extension of downloads
const DOWNLOAD_SUFFIX: &str = "-no-bg";

/// Service for output format conversions and download naming
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Get the appropriate file extension for a given output format
    ///
    /// # Examples
    /// ```rust
    /// use eraseease::{config::OutputFormat, services::OutputFormatHandler};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// Check if a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP => true,
            OutputFormat::Jpg => false,
        }
    }

    /// Warn when a format cannot carry the transparent background
    pub fn validate_for_background_removal(format: OutputFormat) {
        if !Self::supports_transparency(format) {
            log::warn!(
                "Output format {format:?} does not support transparency. Background removal results may appear with a solid background."
            );
        }
    }

    /// Build the client-side download file name for a processed result
    ///
    /// # Examples
    /// ```rust
    /// use eraseease::{config::OutputFormat, services::OutputFormatHandler};
    ///
    /// let name = OutputFormatHandler::download_file_name("cat", OutputFormat::Png);
    /// assert_eq!(name, "cat-no-bg.png");
    /// ```
    #[must_use]
    pub fn download_file_name(base_name: &str, format: OutputFormat) -> String {
        format!(
            "{base_name}{DOWNLOAD_SUFFIX}.{}",
            Self::get_extension(format)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension() {
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpg), "jpg");
        assert_eq!(
            OutputFormatHandler::get_extension(OutputFormat::WebP),
            "webp"
        );
    }

    #[test]
    fn test_supports_transparency() {
        assert!(OutputFormatHandler::supports_transparency(
            OutputFormat::Png
        ));
        assert!(OutputFormatHandler::supports_transparency(
            OutputFormat::WebP
        ));
        assert!(!OutputFormatHandler::supports_transparency(
            OutputFormat::Jpg
        ));
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(
            OutputFormatHandler::download_file_name("cat", OutputFormat::Png),
            "cat-no-bg.png"
        );
        assert_eq!(
            OutputFormatHandler::download_file_name("my.photo", OutputFormat::WebP),
            "my.photo-no-bg.webp"
        );
        assert_eq!(
            OutputFormatHandler::download_file_name("portrait", OutputFormat::Jpg),
            "portrait-no-bg.jpg"
        );
    }
}
