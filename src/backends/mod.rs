//! Background removal service implementations
//!
//! The only production backend talks to a remove.bg-style HTTP API; tests use
//! the scripted mock in [`test_utils`].

pub mod removebg;
pub mod test_utils;

pub use removebg::RemoveBgClient;
