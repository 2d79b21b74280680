//! Supporting services for the workflow controller
//!
//! Follows the separation used across the codebase: format handling, file
//! I/O, and user notification live behind small services so the session holds
//! only workflow logic.

pub mod format;
pub mod io;
pub mod notify;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
pub use notify::{ConsoleNotifier, NoOpNotifier, Notifier};
