//! User notification service
//!
//! Separates the transient user-facing notifications (the toast semantics of
//! the workflow) from business logic, so different frontends can surface them
//! their own way.

/// Trait for surfacing transient user-facing notifications
pub trait Notifier: Send + Sync {
    /// Surface a success notification
    ///
    /// # Arguments
    /// * `message` - Human-readable success text
    fn notify_success(&self, message: &str);

    /// Surface an error notification
    ///
    /// # Arguments
    /// * `message` - Human-readable error text
    fn notify_error(&self, message: &str);
}

/// Notifier that writes through the logging facade
///
/// Suitable for the CLI, where the tracing subscriber formats the output.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        log::info!("{message}");
    }

    fn notify_error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Notifier that discards all notifications
///
/// Used by library callers that handle user feedback themselves.
#[derive(Debug, Default, Clone)]
pub struct NoOpNotifier;

impl NoOpNotifier {
    /// Create a new no-op notifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for NoOpNotifier {
    fn notify_success(&self, _message: &str) {}

    fn notify_error(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Notifier that records everything it is asked to surface
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingNotifier {
        pub(crate) successes: Arc<Mutex<Vec<String>>>,
        pub(crate) errors: Arc<Mutex<Vec<String>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }

        fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_noop_notifier_accepts_messages() {
        let notifier = NoOpNotifier::new();
        notifier.notify_success("done");
        notifier.notify_error("failed");
    }

    #[test]
    fn test_recording_notifier_records() {
        let notifier = RecordingNotifier::default();
        notifier.notify_success("uploaded");
        notifier.notify_error("too large");
        assert_eq!(notifier.successes.lock().unwrap().as_slice(), ["uploaded"]);
        assert_eq!(notifier.errors.lock().unwrap().as_slice(), ["too large"]);
    }
}
