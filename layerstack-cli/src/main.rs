//! # Layerstack
//!
//! Headless layer compositor.

use clap::Parser;
use layerstack_cli::{run, CliArgs, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing; stdout is reserved for the run report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "layerstack=info,layerstack_cli=info,layerstack_compositor=info".into()
            }),
        )
        .with(
            args.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let config = HostConfig::from(args);

    tracing::info!(
        "Importing {} image(s), preview {}x{}",
        config.images.len(),
        config.editor.viewport.width,
        config.editor.viewport.height
    );

    let report = run(&config)?;
    for failure in &report.failed {
        tracing::warn!("Skipped: {failure}");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
