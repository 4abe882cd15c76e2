//! # Sketch Export
//!
//! Command-line renderer for saved sketch whiteboards.

use anyhow::Context;
use clap::Parser;
use sketch_cli::{render, CliArgs, ExportConfig};
use sketch_core::{codec, OptionsDocument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with optional JSON output.
///
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sketch_core=debug,sketch_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ExportConfig::from(CliArgs::parse());
    tracing::info!(
        "Exporting {} to {} ({:?}, {}x{})",
        config.input.display(),
        config.output.display(),
        config.format,
        config.width,
        config.height
    );

    let document = match &config.options {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read options {}", path.display()))?;
            Some(OptionsDocument::from_json(&json).context("Invalid options document")?)
        }
        None => None,
    };
    let options = config.whiteboard_options(document);

    let json = tokio::fs::read_to_string(&config.input)
        .await
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let records = codec::from_json(&json).context("Invalid record file")?;

    let bytes = render(&config, options, records).await?;
    tokio::fs::write(&config.output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    tracing::info!("Wrote {} bytes to {}", bytes.len(), config.output.display());
    Ok(())
}
