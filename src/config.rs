//! Configuration types for background removal operations

use serde::{Deserialize, Serialize};

/// Default endpoint of the remote background-removal service
pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Environment variable consulted for the API credential
pub const API_KEY_ENV_VAR: &str = "REMOVE_BG_API_KEY";

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, solid background)
    Jpg,
    /// WebP with alpha channel transparency
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl OutputFormat {
    /// Value of the `format` field sent to the remote service
    #[must_use]
    pub fn as_field_value(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::WebP => "webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_field_value())
    }
}

/// Export quality options
///
/// Client-side metadata only: the remote contract has no quality field, so
/// this never reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Best available output
    High,
    /// Balanced output
    Medium,
    /// Smallest output
    Low,
}

impl Default for Quality {
    fn default() -> Self {
        Self::High
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Size mode sent to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Keep the original image dimensions
    Full,
    /// Let the service pick the output resolution
    Auto,
}

impl SizeMode {
    /// Value of the `size` field sent to the remote service
    #[must_use]
    pub fn as_field_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Auto => "auto",
        }
    }
}

impl std::fmt::Display for SizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_field_value())
    }
}

/// User-chosen export options applied to the next processing request
/// and to download naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output format for processed results
    pub format: OutputFormat,

    /// Export quality (client-side only)
    pub quality: Quality,

    /// Keep the original image dimensions in the processed result
    pub preserve_size: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: Quality::High,
            preserve_size: true,
        }
    }
}

impl ExportSettings {
    /// Size mode derived from the preserve-size flag
    #[must_use]
    pub fn size_mode(&self) -> SizeMode {
        if self.preserve_size {
            SizeMode::Full
        } else {
            SizeMode::Auto
        }
    }

    /// Merge the set fields of `update` into these settings
    pub fn apply(&mut self, update: ExportSettingsUpdate) {
        if let Some(format) = update.format {
            self.format = format;
        }
        if let Some(quality) = update.quality {
            self.quality = quality;
        }
        if let Some(preserve_size) = update.preserve_size {
            self.preserve_size = preserve_size;
        }
    }
}

/// Partial update for [`ExportSettings`]
///
/// Unset fields leave the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSettingsUpdate {
    /// New output format, if any
    pub format: Option<OutputFormat>,
    /// New quality, if any
    pub quality: Option<Quality>,
    /// New preserve-size flag, if any
    pub preserve_size: Option<bool>,
}

impl ExportSettingsUpdate {
    /// Update only the output format
    #[must_use]
    pub fn format(format: OutputFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    /// Update only the quality
    #[must_use]
    pub fn quality(quality: Quality) -> Self {
        Self {
            quality: Some(quality),
            ..Self::default()
        }
    }

    /// Update only the preserve-size flag
    #[must_use]
    pub fn preserve_size(preserve_size: bool) -> Self {
        Self {
            preserve_size: Some(preserve_size),
            ..Self::default()
        }
    }
}

/// Configuration for background removal operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Credential sent as the `X-Api-Key` header
    pub api_key: String,

    /// Endpoint of the remote background-removal service
    pub endpoint: String,

    /// Request timeout in seconds for the remote call
    pub timeout_secs: u64,

    /// Export settings applied to processing requests
    pub export: ExportSettings,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            export: ExportSettings::default(),
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eraseease::{OutputFormat, RemovalConfig};
    ///
    /// let config = RemovalConfig::builder()
    ///     .api_key("my-key")
    ///     .output_format(OutputFormat::WebP)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.export.format, OutputFormat::WebP);
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Missing API credential (no explicit key and `REMOVE_BG_API_KEY` unset)
    /// - Empty endpoint
    /// - Zero timeout
    pub fn validate(&self) -> crate::Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(crate::error::BgRemovalError::invalid_config(format!(
                "Missing API credential: set it explicitly or via the {API_KEY_ENV_VAR} environment variable"
            )));
        }
        if self.endpoint.trim().is_empty() {
            return Err(crate::error::BgRemovalError::invalid_config(
                "Endpoint must not be empty",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(crate::error::BgRemovalError::invalid_config(
                "Timeout must be at least 1 second",
            ));
        }
        Ok(())
    }
}

/// Builder for [`RemovalConfig`]
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    export: ExportSettings,
}

impl RemovalConfigBuilder {
    /// Set the API credential
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the remote service endpoint
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout in seconds
    #[must_use]
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set the output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.export.format = format;
        self
    }

    /// Set the export quality
    #[must_use]
    pub fn quality(mut self, quality: Quality) -> Self {
        self.export.quality = quality;
        self
    }

    /// Set whether the original image dimensions are preserved
    #[must_use]
    pub fn preserve_size(mut self, preserve_size: bool) -> Self {
        self.export.preserve_size = preserve_size;
        self
    }

    /// Build and validate the configuration
    ///
    /// An unset API key falls back to the `REMOVE_BG_API_KEY` environment
    /// variable before validation.
    ///
    /// # Errors
    /// - Validation failures, see [`RemovalConfig::validate`]
    pub fn build(self) -> crate::Result<RemovalConfig> {
        let api_key = match self.api_key {
            Some(key) => key,
            None => std::env::var(API_KEY_ENV_VAR).unwrap_or_default(),
        };

        let config = RemovalConfig {
            api_key,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout_secs: self.timeout_secs.unwrap_or(60),
            export: self.export,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_settings() {
        let settings = ExportSettings::default();
        assert_eq!(settings.format, OutputFormat::Png);
        assert_eq!(settings.quality, Quality::High);
        assert!(settings.preserve_size);
        assert_eq!(settings.size_mode(), SizeMode::Full);
    }

    #[test]
    fn test_size_mode_from_preserve_size() {
        let settings = ExportSettings {
            preserve_size: false,
            ..ExportSettings::default()
        };
        assert_eq!(settings.size_mode(), SizeMode::Auto);
        assert_eq!(settings.size_mode().as_field_value(), "auto");
    }

    #[test]
    fn test_partial_update_merges_only_set_fields() {
        let mut settings = ExportSettings::default();
        settings.apply(ExportSettingsUpdate::format(OutputFormat::Jpg));
        assert_eq!(settings.format, OutputFormat::Jpg);
        assert_eq!(settings.quality, Quality::High);
        assert!(settings.preserve_size);

        settings.apply(ExportSettingsUpdate {
            quality: Some(Quality::Low),
            preserve_size: Some(false),
            ..ExportSettingsUpdate::default()
        });
        assert_eq!(settings.format, OutputFormat::Jpg);
        assert_eq!(settings.quality, Quality::Low);
        assert!(!settings.preserve_size);
    }

    #[test]
    fn test_builder_rejects_missing_api_key() {
        // Explicit empty key never consults the environment
        let result = RemovalConfig::builder().api_key("").build();
        assert!(matches!(
            result,
            Err(crate::error::BgRemovalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = RemovalConfig::builder()
            .api_key("key")
            .timeout_secs(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let config = RemovalConfig::builder().api_key("key").build().unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.export, ExportSettings::default());
    }

    #[test]
    fn test_format_field_values() {
        assert_eq!(OutputFormat::Png.as_field_value(), "png");
        assert_eq!(OutputFormat::Jpg.as_field_value(), "jpg");
        assert_eq!(OutputFormat::WebP.as_field_value(), "webp");
    }
}
