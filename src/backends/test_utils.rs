//! Test utilities and a mock remote service
//!
//! Provides a scripted implementation of the [`BackgroundRemover`] trait so
//! workflow behavior can be tested without network access or credentials.

use crate::error::{BgRemovalError, Result};
use crate::service::{BackgroundRemover, ProcessingRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted outcome for a single mock call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Respond with the given binary payload
    Success(Vec<u8>),
    /// Respond with the quota-exhaustion error
    QuotaExhausted,
    /// Respond with a generic service failure carrying this message
    Failure(String),
    /// Fail at the transport level
    NetworkError,
}

/// Mock remote service for testing
///
/// Outcomes are consumed in order; once the script is exhausted every further
/// call succeeds with a tiny valid PNG. The call counter lets tests assert
/// the single-outbound-request property.
#[derive(Debug, Clone)]
pub struct MockRemover {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<AtomicUsize>,
    /// Requests observed by the mock, for wire-field verification
    requests: Arc<Mutex<Vec<ProcessingRequest>>>,
}

impl MockRemover {
    /// Create a mock that always succeeds with a tiny valid PNG
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock scripted with the given outcomes
    #[must_use]
    pub fn with_outcomes<I: IntoIterator<Item = MockOutcome>>(outcomes: I) -> Self {
        let mock = Self::new();
        mock.outcomes.lock().unwrap().extend(outcomes);
        mock
    }

    /// Create a mock whose first call reports exhausted credits
    #[must_use]
    pub fn quota_exhausted() -> Self {
        Self::with_outcomes([MockOutcome::QuotaExhausted])
    }

    /// Create a mock whose first call fails with the given service message
    #[must_use]
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self::with_outcomes([MockOutcome::Failure(message.into())])
    }

    /// Number of calls the mock has received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests observed so far, in call order
    pub fn requests(&self) -> Vec<ProcessingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockRemover {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    async fn remove_background(&self, request: &ProcessingRequest) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Success(tiny_png()));

        match outcome {
            MockOutcome::Success(bytes) => Ok(bytes),
            MockOutcome::QuotaExhausted => Err(BgRemovalError::quota_exhausted()),
            MockOutcome::Failure(message) => Err(BgRemovalError::remote_processing(message)),
            MockOutcome::NetworkError => Err(BgRemovalError::Network(
                "simulated connection failure".to_string(),
            )),
        }
    }
}

/// Encode a 1x1 transparent PNG for use as a decodable mock payload
#[must_use]
pub fn tiny_png() -> Vec<u8> {
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    let image = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encoding a 1x1 PNG cannot fail");
    buffer.into_inner()
}
