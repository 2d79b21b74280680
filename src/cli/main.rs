//! Background removal CLI tool
//!
//! Command-line interface around the removal session: one image per
//! invocation, plus consent-preference management flags.

use crate::config::{OutputFormat, Quality, RemovalConfig};
use crate::prefs::{ConsentFlag, ConsentStore};
use crate::services::{ConsoleNotifier, ImageIOService};
use crate::session::RemovalSession;
use crate::tracing_config::init_cli_tracing;
use crate::RemoveBgClient;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Background removal CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "eraseease")]
pub struct Cli {
    /// Input image file (PNG, JPG, or WebP, max 10MB)
    #[arg(value_name = "INPUT", required_unless_present_any = &["show_consent", "set_analytics", "set_advertising", "clear_consent"])]
    pub input: Option<PathBuf>,

    /// Output file [default: <input base name>-no-bg.<format> next to the input]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// Export quality
    #[arg(short, long, value_enum, default_value_t = CliQuality::High)]
    pub quality: CliQuality,

    /// Let the service pick the output resolution instead of keeping the original size
    #[arg(long)]
    pub no_preserve_size: bool,

    /// API credential [default: the REMOVE_BG_API_KEY environment variable]
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Show stored consent preferences and exit
    #[arg(long)]
    pub show_consent: bool,

    /// Store the analytics consent flag and exit
    #[arg(long, value_name = "BOOL")]
    pub set_analytics: Option<bool>,

    /// Store the advertising consent flag and exit
    #[arg(long, value_name = "BOOL")]
    pub set_advertising: Option<bool>,

    /// Remove all stored consent preferences and exit
    #[arg(long)]
    pub clear_consent: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpg,
    Webp,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpg => Self::Jpg,
            CliOutputFormat::Webp => Self::WebP,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliQuality {
    High,
    Medium,
    Low,
}

impl From<CliQuality> for Quality {
    fn from(quality: CliQuality) -> Self {
        match quality {
            CliQuality::High => Self::High,
            CliQuality::Medium => Self::Medium,
            CliQuality::Low => Self::Low,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    // Consent management flags run without an input image
    if cli.show_consent || cli.clear_consent || cli.set_analytics.is_some() || cli.set_advertising.is_some() {
        return handle_consent_flags(&cli);
    }

    let input = cli
        .input
        .as_ref()
        .context("An input image is required")?;

    // The builder falls back to REMOVE_BG_API_KEY when no key is given
    let mut builder = RemovalConfig::builder()
        .timeout_secs(cli.timeout)
        .output_format(cli.format.into())
        .quality(cli.quality.into())
        .preserve_size(!cli.no_preserve_size);
    if let Some(api_key) = &cli.api_key {
        builder = builder.api_key(api_key);
    }
    let config = builder.build().context("Invalid configuration")?;

    let candidate = ImageIOService::load_candidate(input)
        .with_context(|| format!("Failed to load '{}'", input.display()))?;

    let client = RemoveBgClient::new(&config).context("Failed to create service client")?;
    let mut session = RemovalSession::with_notifier(Box::new(ConsoleNotifier::new()));
    session.update_export_settings(crate::config::ExportSettingsUpdate {
        format: Some(config.export.format),
        quality: Some(config.export.quality),
        preserve_size: Some(config.export.preserve_size),
    });

    session
        .accept_upload(candidate)
        .context("Upload refused")?;

    let spinner = create_spinner();
    spinner.set_message("Removing background...");

    let start_time = Instant::now();
    let processing = session.process(&client).await;
    spinner.finish_and_clear();
    processing.context("Processing failed")?;

    let action = session
        .download_action()
        .context("Processing finished without a result")?;

    let output_path = cli.output.clone().unwrap_or_else(|| {
        input
            .parent()
            .map_or_else(|| PathBuf::from(&action.file_name), |dir| dir.join(&action.file_name))
    });

    let result = session
        .result()
        .context("Processing finished without a result")?;
    ImageIOService::save_result(result, &output_path)
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    println!(
        "Saved {} ({:.2}s)",
        output_path.display(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Handle the consent-preference flags and exit
fn handle_consent_flags(cli: &Cli) -> Result<()> {
    let store = ConsentStore::new().context("Failed to open preference store")?;

    if let Some(value) = cli.set_analytics {
        store
            .set(ConsentFlag::Analytics, value)
            .context("Failed to store analytics consent")?;
        println!("Analytics consent set to {value}");
    }

    if let Some(value) = cli.set_advertising {
        store
            .set(ConsentFlag::Advertising, value)
            .context("Failed to store advertising consent")?;
        println!("Advertising consent set to {value}");
    }

    if cli.clear_consent {
        store.clear_all().context("Failed to clear consent preferences")?;
        println!("All consent preferences cleared");
    }

    if cli.show_consent {
        println!(
            "Analytics consent:   {}",
            store.get(ConsentFlag::Analytics)
        );
        println!(
            "Advertising consent: {}",
            store.get(ConsentFlag::Advertising)
        );
    }

    Ok(())
}

/// Create the spinner shown while the remote request is in flight
fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_format_mapping() {
        assert_eq!(OutputFormat::from(CliOutputFormat::Png), OutputFormat::Png);
        assert_eq!(OutputFormat::from(CliOutputFormat::Jpg), OutputFormat::Jpg);
        assert_eq!(
            OutputFormat::from(CliOutputFormat::Webp),
            OutputFormat::WebP
        );
    }

    #[test]
    fn test_cli_quality_mapping() {
        assert_eq!(Quality::from(CliQuality::High), Quality::High);
        assert_eq!(Quality::from(CliQuality::Medium), Quality::Medium);
        assert_eq!(Quality::from(CliQuality::Low), Quality::Low);
    }

    #[test]
    fn test_consent_flags_do_not_require_input() {
        let cli = Cli::try_parse_from(["eraseease", "--show-consent"]).unwrap();
        assert!(cli.show_consent);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_input_required_without_consent_flags() {
        assert!(Cli::try_parse_from(["eraseease"]).is_err());
    }

    #[test]
    fn test_set_consent_parses_bool_value() {
        let cli = Cli::try_parse_from(["eraseease", "--set-analytics", "true"]).unwrap();
        assert_eq!(cli.set_analytics, Some(true));

        let cli = Cli::try_parse_from(["eraseease", "--set-advertising", "false"]).unwrap();
        assert_eq!(cli.set_advertising, Some(false));
    }
}
