//! wac — entry point.

use clap::Parser;

use wac::report::{JsonReporter, TextReporter};
use wac::{scan_config, source, Cli, UrlInput};
use wac_core::Reporter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = scan_config(&cli)?;
    let urls = source::open(&UrlInput::from_arg(&cli.urls)).await?;

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::stdout())
    } else {
        Box::new(TextReporter::stdout())
    };

    let summary = wac_core::run(&config, urls, reporter).await?;
    tracing::info!(
        "{} granted, {} denied, {} errors, {} bodies released by cleanup",
        summary.granted,
        summary.denied,
        summary.errors,
        summary.released
    );

    Ok(())
}
