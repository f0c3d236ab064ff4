//! notify-hub - send one notification through the configured backend.

use anyhow::{bail, Context, Result};
use clap::Parser;
use notify_hub::{cli::Cli, config::Config, ExtensionMetadata, Notify};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            error!("Failed to load configuration: {:#}", err);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let message = match cli.message.clone() {
        Some(message) => message,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read the message from stdin")?;
            buffer
        }
    };
    if message.trim().is_empty() {
        bail!("No message given");
    }

    let extension = cli.extension.as_deref().and_then(load_extension);

    let notify = Notify::new(config);
    info!(platform = ?notify.platform(), "Sending notification");

    let report = notify.send(message.trim_end(), extension.as_ref()).await?;
    match &report.fan_out {
        Some(fan_out) => {
            for failure in fan_out.failures() {
                if let Err(e) = &failure.result {
                    warn!(chat_id = failure.chat_id, error = %e, "Recipient not reached");
                }
            }
            info!(
                platform = %report.platform,
                attempted = fan_out.attempted(),
                delivered = fan_out.delivered(),
                "Fan-out complete"
            );
        }
        None => info!(platform = %report.platform, "Notification sent"),
    }
    Ok(())
}

/// Reads extension metadata, treating an unreadable or malformed file as absent.
fn load_extension(path: &Path) -> Option<ExtensionMetadata> {
    match std::fs::read_to_string(path) {
        Ok(raw) => ExtensionMetadata::from_json(&raw),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable extension file");
            None
        }
    }
}
