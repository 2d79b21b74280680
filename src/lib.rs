#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # EraseEase Background Removal Library
//!
//! A Rust client for remove.bg-style background-removal HTTP APIs, built
//! around a session workflow controller that manages one image transaction
//! at a time: upload validation, a single in-flight remote request, the
//! processed result, export settings, and display zoom.
//!
//! ## Features
//!
//! - **Upload validation**: JPEG, PNG, and WebP with a 10 MiB size limit
//! - **Workflow state machine**: `Empty → Loaded → Processing →
//!   {Completed, Failed}`, with stale-response protection when an upload is
//!   replaced or reset mid-flight
//! - **Remote API client**: multipart `reqwest` client speaking the
//!   remove.bg wire contract, including quota-exhaustion detection
//! - **Export settings**: output format, quality, and size preservation with
//!   partial updates
//! - **Consent preferences**: file-backed analytics/advertising flags with
//!   ~1 year expiry
//! - **CLI integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ### One-shot processing
//!
//! ```rust,no_run
//! use eraseease::{remove_background_from_path, RemovalConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Credential from REMOVE_BG_API_KEY unless set explicitly
//! let config = RemovalConfig::builder().build()?;
//! let result = remove_background_from_path("input.jpg", &config).await?;
//! result.save("input-no-bg.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Session workflow
//!
//! ```rust,no_run
//! use eraseease::{
//!     RemovalConfig, RemovalSession, RemoveBgClient, UploadCandidate,
//! };
//!
//! # async fn example(bytes: Vec<u8>) -> anyhow::Result<()> {
//! let config = RemovalConfig::builder().api_key("my-key").build()?;
//! let client = RemoveBgClient::new(&config)?;
//!
//! let mut session = RemovalSession::new();
//! session.accept_upload(UploadCandidate::new("cat.png", "image/png", bytes))?;
//! session.process(&client).await?;
//!
//! if let Some(action) = session.download_action() {
//!     std::fs::write(&action.file_name, action.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! All workflow functionality is available by default; enable the `cli`
//! feature for the command-line interface and progress reporting. To use
//! only as a library:
//!
//! ```toml
//! [dependencies]
//! eraseease = { version = "0.2", default-features = false, features = ["webp-support"] }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod prefs;
pub mod service;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use std::path::Path;

// Public API exports
pub use backends::RemoveBgClient;
pub use config::{
    ExportSettings, ExportSettingsUpdate, OutputFormat, Quality, RemovalConfig,
    RemovalConfigBuilder, SizeMode,
};
pub use error::{BgRemovalError, Result};
pub use prefs::{ConsentFlag, ConsentStore};
pub use service::{BackgroundRemover, ProcessingRequest};
pub use services::{
    ConsoleNotifier, ImageIOService, NoOpNotifier, Notifier, OutputFormatHandler,
};
pub use session::{
    DownloadAction, RemovalSession, SessionState, ZoomDirection, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
pub use types::{MediaType, ProcessedResult, UploadCandidate, UploadedImage, MAX_FILE_SIZE};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove the background from an image provided as bytes
///
/// Runs the full accept → process pipeline over a fresh session and the real
/// remote client. The declared media type is taken from the file name's
/// extension.
///
/// # Arguments
///
/// * `image_bytes` - Raw image data (JPEG, PNG, WebP)
/// * `file_name` - Original file name, used for type detection and naming
/// * `config` - Configuration including credential and export settings
///
/// # Errors
///
/// - `UnsupportedFormat` / `FileTooLarge` when the upload is refused
/// - `QuotaExhausted` / `RemoteProcessing` / `Network` from the remote call
///
/// # Examples
/// ```rust,no_run
/// use eraseease::{remove_background_from_bytes, RemovalConfig};
///
/// # async fn example(upload_bytes: Vec<u8>) -> anyhow::Result<()> {
/// let config = RemovalConfig::builder().api_key("my-key").build()?;
/// let result = remove_background_from_bytes(&upload_bytes, "cat.png", &config).await?;
/// result.save("cat-no-bg.png")?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    file_name: &str,
    config: &RemovalConfig,
) -> Result<ProcessedResult> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| BgRemovalError::unsupported_format("file has no extension"))?;
    let media_type = MediaType::from_extension(extension)?;
    let candidate = UploadCandidate::new(file_name, media_type.as_mime(), image_bytes.to_vec());
    process_candidate(candidate, config).await
}

/// Remove the background from an image file
///
/// Reads the file (refusing oversized or unsupported ones before the bytes
/// are loaded) and runs the full pipeline against the remote service.
///
/// # Errors
///
/// - File system errors while reading
/// - `UnsupportedFormat` / `FileTooLarge` when the upload is refused
/// - `QuotaExhausted` / `RemoteProcessing` / `Network` from the remote call
pub async fn remove_background_from_path<P: AsRef<Path>>(
    path: P,
    config: &RemovalConfig,
) -> Result<ProcessedResult> {
    let candidate = ImageIOService::load_candidate(path)?;
    process_candidate(candidate, config).await
}

async fn process_candidate(
    candidate: UploadCandidate,
    config: &RemovalConfig,
) -> Result<ProcessedResult> {
    let client = RemoveBgClient::new(config)?;

    let mut session = RemovalSession::new();
    session.update_export_settings(ExportSettingsUpdate {
        format: Some(config.export.format),
        quality: Some(config.export.quality),
        preserve_size: Some(config.export.preserve_size),
    });
    session.accept_upload(candidate)?;
    session.process(&client).await?;

    session
        .result()
        .cloned()
        .ok_or_else(|| BgRemovalError::remote_processing(error::GENERIC_FAILURE_MESSAGE))
}
