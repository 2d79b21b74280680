//! EraseEase background removal CLI tool
//!
//! Command-line interface for removing image backgrounds through the
//! eraseease library and a remove.bg-style remote service.

#[cfg(feature = "cli")]
use eraseease::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
