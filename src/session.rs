//! The background-removal workflow controller
//!
//! [`RemovalSession`] manages one image transaction at a time: a single
//! upload slot, at most one in-flight processing request, the processed
//! result, export settings, and the display zoom. State follows
//! `Empty → Loaded → Processing → {Completed, Failed}`, with completed and
//! failed attempts recoverable by re-processing or re-uploading.
//!
//! Processing is split into two phases so interleavings stay explicit:
//! [`RemovalSession::begin_processing`] transitions into `Processing` and
//! yields the request, [`RemovalSession::finish_processing`] applies the
//! outcome. Every request is tagged with the [`uuid::Uuid`] of the upload it
//! was built from; an outcome whose tag no longer matches the current slot is
//! discarded, so a late response for a superseded image can never overwrite
//! state. [`RemovalSession::process`] wraps both phases around a single
//! remote call.

use crate::config::{ExportSettings, ExportSettingsUpdate};
use crate::error::{BgRemovalError, Result};
use crate::service::{BackgroundRemover, ProcessingRequest};
use crate::services::format::OutputFormatHandler;
use crate::services::notify::{NoOpNotifier, Notifier};
use crate::types::{MediaType, ProcessedResult, UploadCandidate, UploadedImage, MAX_FILE_SIZE};

/// Minimum display zoom factor
pub const ZOOM_MIN: f32 = 0.5;
/// Maximum display zoom factor
pub const ZOOM_MAX: f32 = 2.0;
/// Zoom adjustment step
pub const ZOOM_STEP: f32 = 0.1;

/// Workflow states of a removal session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded
    Empty,
    /// An image is loaded and ready for processing
    Loaded,
    /// A processing request is in flight
    Processing,
    /// The current image has a processed result
    Completed,
    /// The last processing attempt failed
    Failed,
}

/// Zoom adjustment direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Increase magnification
    In,
    /// Decrease magnification
    Out,
}

/// A client-initiated save action for a processed result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAction<'a> {
    /// Suggested file name, `<originalBaseName>-no-bg.<format>`
    pub file_name: String,
    /// The processed image bytes
    pub bytes: &'a [u8],
}

/// State machine managing one image transaction at a time
pub struct RemovalSession {
    state: SessionState,
    upload: Option<UploadedImage>,
    result: Option<ProcessedResult>,
    settings: ExportSettings,
    zoom: f32,
    notifier: Box<dyn Notifier>,
}

impl RemovalSession {
    /// Create a session with default settings and no user notifications
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(Box::new(NoOpNotifier::new()))
    }

    /// Create a session that surfaces notifications through `notifier`
    #[must_use]
    pub fn with_notifier(notifier: Box<dyn Notifier>) -> Self {
        Self {
            state: SessionState::Empty,
            upload: None,
            result: None,
            settings: ExportSettings::default(),
            zoom: 1.0,
            notifier,
        }
    }

    /// Current workflow state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The currently loaded image, if any
    #[must_use]
    pub fn upload(&self) -> Option<&UploadedImage> {
        self.upload.as_ref()
    }

    /// The processed result for the current image, if any
    #[must_use]
    pub fn result(&self) -> Option<&ProcessedResult> {
        self.result.as_ref()
    }

    /// Current export settings
    #[must_use]
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Current display zoom factor
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Accept a user-supplied file into the upload slot
    ///
    /// Validates the declared media type and the 10 MiB size limit before
    /// touching any state: a refused candidate leaves the session exactly as
    /// it was. On success the slot is replaced wholesale, any processed
    /// result is cleared, zoom returns to 1.0, and the state becomes
    /// `Loaded`. A replacement during `Processing` is allowed; the in-flight
    /// response becomes stale and will be discarded on arrival.
    ///
    /// # Errors
    /// - `UnsupportedFormat` when the declared type is not JPEG, PNG, or WebP
    /// - `FileTooLarge` when the candidate exceeds 10 MiB
    pub fn accept_upload(&mut self, candidate: UploadCandidate) -> Result<()> {
        let media_type = match MediaType::from_mime(&candidate.declared_type) {
            Ok(media_type) => media_type,
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                return Err(err);
            },
        };

        if candidate.size() > MAX_FILE_SIZE {
            let err = BgRemovalError::FileTooLarge {
                size: candidate.size(),
                limit: MAX_FILE_SIZE,
            };
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        let upload = UploadedImage::new(candidate.file_name, media_type, candidate.bytes);
        tracing::debug!(upload_id = %upload.id(), file = %upload.file_name(), "Accepted upload");

        self.upload = Some(upload);
        self.result = None;
        self.zoom = 1.0;
        self.state = SessionState::Loaded;
        self.notifier.notify_success("Image uploaded successfully!");
        Ok(())
    }

    /// Transition into `Processing` and build the outbound request
    ///
    /// Returns `Ok(None)` while a request is already in flight: the
    /// controller neither queues nor cancels, the invocation is ignored.
    ///
    /// # Errors
    /// - `NoImageLoaded` when the slot is empty
    pub fn begin_processing(&mut self) -> Result<Option<ProcessingRequest>> {
        if self.state == SessionState::Processing {
            tracing::debug!("Processing already in flight, ignoring submit");
            return Ok(None);
        }

        let Some(upload) = self.upload.as_ref() else {
            let err = BgRemovalError::NoImageLoaded;
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        };

        let request =
            ProcessingRequest::for_upload(upload, self.settings.size_mode(), self.settings.format);
        tracing::debug!(
            upload_id = %request.upload_id,
            size = %request.size_mode,
            format = %request.output_format,
            "Processing started"
        );
        self.state = SessionState::Processing;
        Ok(Some(request))
    }

    /// Apply the outcome of a processing request
    ///
    /// An outcome for a request whose upload id no longer matches the
    /// current slot is discarded without touching state. Otherwise a success
    /// payload is decoded into the [`ProcessedResult`] (state `Completed`),
    /// and a failure records the attempt as `Failed` and surfaces the
    /// user-facing message (quota errors keep their dedicated text).
    ///
    /// # Errors
    /// - The failure carried by `outcome`, after the state transition
    /// - `Image` when a success payload cannot be decoded
    pub fn finish_processing(
        &mut self,
        request: &ProcessingRequest,
        outcome: Result<Vec<u8>>,
    ) -> Result<()> {
        let current_id = self.upload.as_ref().map(UploadedImage::id);
        if current_id != Some(request.upload_id) {
            tracing::debug!(
                upload_id = %request.upload_id,
                "Discarding stale processing outcome for superseded upload"
            );
            return Ok(());
        }

        match outcome {
            Ok(bytes) => {
                // Reject undecodable payloads before they become the result
                let decoded = image::load_from_memory(&bytes);
                if let Err(err) = decoded {
                    self.state = SessionState::Failed;
                    let err = BgRemovalError::from(err);
                    self.notifier.notify_error(&err.user_message());
                    return Err(err);
                }

                self.result = Some(ProcessedResult::new(
                    bytes,
                    request.output_format,
                    request.upload_id,
                ));
                self.state = SessionState::Completed;
                tracing::debug!(upload_id = %request.upload_id, "Processing completed");
                self.notifier
                    .notify_success("Background removed successfully!");
                Ok(())
            },
            Err(err) => {
                self.state = SessionState::Failed;
                tracing::debug!(upload_id = %request.upload_id, error = %err, "Processing failed");
                self.notifier.notify_error(&err.user_message());
                Err(err)
            },
        }
    }

    /// Run one processing attempt against `remover`
    ///
    /// Issues exactly one outbound request per transition into `Processing`;
    /// a call made while a request is already in flight returns without
    /// contacting the service.
    ///
    /// # Errors
    /// - `NoImageLoaded` when the slot is empty
    /// - Any error from the remote call, after the `Failed` transition
    pub async fn process(&mut self, remover: &dyn BackgroundRemover) -> Result<()> {
        let Some(request) = self.begin_processing()? else {
            return Ok(());
        };
        let outcome = remover.remove_background(&request).await;
        self.finish_processing(&request, outcome)
    }

    /// The client-initiated save action for the current result
    ///
    /// `None` when there is no processed result; never errors and never
    /// changes state. The file name is derived from the original upload's
    /// base name and the currently selected export format, so changing the
    /// format after processing changes the suggested name.
    #[must_use]
    pub fn download_action(&self) -> Option<DownloadAction<'_>> {
        let result = self.result.as_ref()?;
        let upload = self.upload.as_ref()?;
        Some(DownloadAction {
            file_name: OutputFormatHandler::download_file_name(
                upload.base_name(),
                self.settings.format,
            ),
            bytes: result.bytes(),
        })
    }

    /// Adjust the display zoom by one step, clamped to `[0.5, 2.0]`
    ///
    /// Steps are computed in exact tenths so repeated adjustments at the
    /// boundaries are idempotent. Returns the new zoom factor.
    pub fn adjust_zoom(&mut self, direction: ZoomDirection) -> f32 {
        let step_tenths = (ZOOM_STEP * 10.0).round() as i32;
        let step = match direction {
            ZoomDirection::In => step_tenths,
            ZoomDirection::Out => -step_tenths,
        };
        let tenths = (self.zoom * 10.0).round() as i32 + step;
        let min_tenths = (ZOOM_MIN * 10.0).round() as i32;
        let max_tenths = (ZOOM_MAX * 10.0).round() as i32;
        self.zoom = tenths.clamp(min_tenths, max_tenths) as f32 / 10.0;
        self.zoom
    }

    /// Merge a partial update into the export settings
    ///
    /// No validation beyond the enumerated domains, no state-machine effect;
    /// the new settings apply to the next processing request.
    pub fn update_export_settings(&mut self, update: ExportSettingsUpdate) {
        self.settings.apply(update);
        OutputFormatHandler::validate_for_background_removal(self.settings.format);
    }

    /// Clear the upload, result, and zoom; return to `Empty`
    ///
    /// Always succeeds, including during `Processing` (the in-flight
    /// response becomes stale and will be discarded on arrival).
    pub fn reset(&mut self) {
        self.upload = None;
        self.result = None;
        self.zoom = 1.0;
        self.state = SessionState::Empty;
        tracing::debug!("Session reset");
        self.notifier.notify_success("Image reset successfully");
    }
}

impl Default for RemovalSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{tiny_png, MockOutcome, MockRemover};
    use crate::config::{OutputFormat, Quality};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct RecordingNotifier {
        successes: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }

        fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn png_candidate(name: &str) -> UploadCandidate {
        UploadCandidate::new(name, "image/png", tiny_png())
    }

    #[test]
    fn test_accept_upload_transitions_to_loaded() {
        let mut session = RemovalSession::new();
        assert_eq!(session.state(), SessionState::Empty);

        session.accept_upload(png_candidate("cat.png")).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.upload().is_some());
        assert!(session.result().is_none());
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn test_accept_upload_refuses_unsupported_type_without_state_change() {
        let mut session = RemovalSession::new();
        let candidate = UploadCandidate::new("scan.gif", "image/gif", vec![1, 2, 3]);

        let result = session.accept_upload(candidate);
        assert!(matches!(
            result,
            Err(BgRemovalError::UnsupportedFormat(_))
        ));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.upload().is_none());
    }

    #[test]
    fn test_accept_upload_refuses_oversized_file() {
        let mut session = RemovalSession::new();
        let candidate = UploadCandidate::new(
            "photo.jpg",
            "image/jpeg",
            vec![0u8; (MAX_FILE_SIZE + 1) as usize],
        );

        let result = session.accept_upload(candidate);
        assert!(matches!(result, Err(BgRemovalError::FileTooLarge { .. })));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_new_upload_clears_result_and_zoom() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("a.png")).unwrap();
        session.adjust_zoom(ZoomDirection::In);
        session.adjust_zoom(ZoomDirection::In);

        // Fabricate a completed state via a full processing round
        let request = session.begin_processing().unwrap().unwrap();
        session.finish_processing(&request, Ok(tiny_png())).unwrap();
        assert_eq!(session.state(), SessionState::Completed);

        session.accept_upload(png_candidate("b.png")).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.result().is_none());
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn test_begin_processing_requires_upload() {
        let mut session = RemovalSession::new();
        assert!(matches!(
            session.begin_processing(),
            Err(BgRemovalError::NoImageLoaded)
        ));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_begin_processing_is_ignored_while_in_flight() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let first = session.begin_processing().unwrap();
        assert!(first.is_some());
        assert_eq!(session.state(), SessionState::Processing);

        let second = session.begin_processing().unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_double_submit_issues_one_outbound_request() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        let mock = MockRemover::new();

        // Hold the Processing state open by finishing manually
        let request = session.begin_processing().unwrap().unwrap();
        // Second submit while in flight contacts nothing
        session.process(&mock).await.unwrap();
        assert_eq!(mock.call_count(), 0);

        let outcome = mock.remove_background(&request).await;
        session.finish_processing(&request, outcome).unwrap();
        assert_eq!(mock.call_count(), 1);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn test_successful_processing_reaches_completed() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let mock = MockRemover::new();
        session.process(&mock).await.unwrap();

        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.result().is_some());
        assert!(session.download_action().is_some());
    }

    #[tokio::test]
    async fn test_request_carries_settings_on_the_wire() {
        let mut session = RemovalSession::new();
        session.update_export_settings(ExportSettingsUpdate {
            format: Some(OutputFormat::WebP),
            preserve_size: Some(false),
            quality: Some(Quality::Medium),
        });
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let mock = MockRemover::new();
        session.process(&mock).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].size_mode.as_field_value(), "auto");
        assert_eq!(requests[0].output_format, OutputFormat::WebP);
    }

    #[tokio::test]
    async fn test_quota_error_surfaces_quota_message() {
        let notifier = RecordingNotifier::default();
        let mut session = RemovalSession::with_notifier(Box::new(notifier.clone()));
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let mock = MockRemover::quota_exhausted();
        let result = session.process(&mock).await;

        assert!(matches!(result, Err(BgRemovalError::QuotaExhausted(_))));
        assert_eq!(session.state(), SessionState::Failed);
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(
            errors.last().unwrap(),
            crate::error::QUOTA_EXHAUSTED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_generic_failure_surfaces_service_message() {
        let notifier = RecordingNotifier::default();
        let mut session = RemovalSession::with_notifier(Box::new(notifier.clone()));
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let mock = MockRemover::failing("Could not identify foreground");
        let result = session.process(&mock).await;

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Failed);
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(errors.last().unwrap(), "Could not identify foreground");
    }

    #[tokio::test]
    async fn test_failed_attempt_is_recoverable() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();

        let mock = MockRemover::with_outcomes([
            MockOutcome::Failure("transient".to_string()),
            MockOutcome::Success(tiny_png()),
        ]);

        assert!(session.process(&mock).await.is_err());
        assert_eq!(session.state(), SessionState::Failed);

        session.process(&mock).await.unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_stale_outcome_after_reset_is_discarded() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        let request = session.begin_processing().unwrap().unwrap();

        session.reset();
        assert_eq!(session.state(), SessionState::Empty);

        session.finish_processing(&request, Ok(tiny_png())).unwrap();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_stale_outcome_after_new_upload_is_discarded() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("a.png")).unwrap();
        let request = session.begin_processing().unwrap().unwrap();

        session.accept_upload(png_candidate("b.png")).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);

        // Late success for image A must not become image B's result
        session.finish_processing(&request, Ok(tiny_png())).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.result().is_none());

        // And a stale failure must not flip B into Failed either
        session
            .finish_processing(&request, Err(BgRemovalError::quota_exhausted()))
            .unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_undecodable_payload_fails_the_attempt() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        let request = session.begin_processing().unwrap().unwrap();

        let result = session.finish_processing(&request, Ok(b"not an image".to_vec()));
        assert!(matches!(result, Err(BgRemovalError::Image(_))));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_download_action_names_file_from_upload_and_format() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        session.process(&MockRemover::new()).await.unwrap();

        let action = session.download_action().unwrap();
        assert_eq!(action.file_name, "cat-no-bg.png");
        assert!(!action.bytes.is_empty());
    }

    #[tokio::test]
    async fn test_download_name_follows_format_changed_after_completion() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        session.process(&MockRemover::new()).await.unwrap();
        assert_eq!(session.download_action().unwrap().file_name, "cat-no-bg.png");

        session.update_export_settings(ExportSettingsUpdate::format(OutputFormat::WebP));
        assert_eq!(
            session.download_action().unwrap().file_name,
            "cat-no-bg.webp"
        );
        // The result itself still records the format it was produced in
        assert_eq!(session.result().unwrap().format(), OutputFormat::Png);
    }

    #[test]
    fn test_download_action_is_none_without_result() {
        let mut session = RemovalSession::new();
        assert!(session.download_action().is_none());

        session.accept_upload(png_candidate("cat.png")).unwrap();
        assert!(session.download_action().is_none());
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut session = RemovalSession::new();
        assert_eq!(session.zoom(), 1.0);

        // One adjustment moves by exactly the published step
        assert_eq!(session.adjust_zoom(ZoomDirection::In), 1.0 + ZOOM_STEP);
        assert_eq!(session.adjust_zoom(ZoomDirection::Out), 1.0);

        // Repeated zoom-out bottoms out at 0.5 and stays there
        for _ in 0..20 {
            session.adjust_zoom(ZoomDirection::Out);
        }
        assert_eq!(session.zoom(), ZOOM_MIN);
        assert_eq!(session.adjust_zoom(ZoomDirection::Out), ZOOM_MIN);

        // Repeated zoom-in tops out at 2.0 and stays there
        for _ in 0..40 {
            session.adjust_zoom(ZoomDirection::In);
        }
        assert_eq!(session.zoom(), ZOOM_MAX);
        assert_eq!(session.adjust_zoom(ZoomDirection::In), ZOOM_MAX);
    }

    #[test]
    fn test_zoom_does_not_affect_workflow_state() {
        let mut session = RemovalSession::new();
        session.accept_upload(png_candidate("cat.png")).unwrap();
        session.adjust_zoom(ZoomDirection::In);
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_reset_always_returns_to_empty() {
        let mut session = RemovalSession::new();
        session.reset();
        assert_eq!(session.state(), SessionState::Empty);

        session.accept_upload(png_candidate("cat.png")).unwrap();
        session.adjust_zoom(ZoomDirection::In);
        session.reset();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.upload().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn test_settings_update_keeps_unset_fields() {
        let mut session = RemovalSession::new();
        session.update_export_settings(ExportSettingsUpdate::quality(Quality::Low));
        assert_eq!(session.settings().quality, Quality::Low);
        assert_eq!(session.settings().format, OutputFormat::Png);
        assert!(session.settings().preserve_size);
    }
}
