//! notifiable - dispatch activities from a JSON file through the configured
//! couriers.

use anyhow::{Context, Result};
use clap::Parser;
use notifiable::{
    activity::Activity,
    app::App,
    cli::Cli,
    config::{Config, LogFormat},
    NotificationStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).context("failed to load configuration")?;

    init_tracing(&config);

    info!("notifiable starting up...");

    // Log the loaded configuration settings for visibility
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!(
        "Log Courier: {}",
        if config.couriers.log.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    match &config.couriers.push {
        Some(push) => info!(
            "Push Courier: {} (channel {}, timeout {}ms)",
            push.webhook_url, push.channel, push.timeout_ms
        ),
        None => info!("Push Courier: Disabled"),
    }
    for (kind, couriers) in &config.routes {
        info!("Route: {} -> [{}]", kind, couriers.join(", "));
    }
    info!("-------------------------------------------------------");

    let Some(events_path) = cli.events.as_ref() else {
        warn!("No --events file given, nothing to dispatch.");
        return Ok(());
    };

    let raw = tokio::fs::read_to_string(events_path)
        .await
        .with_context(|| format!("failed to read {}", events_path.display()))?;
    let activities: Vec<Activity> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse activities in {}", events_path.display()))?;

    let app = App::builder(config).build()?;
    let report = match app.dispatch_all(&activities).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Dispatch failed");
            return Err(e.into());
        }
    };

    println!(
        "dispatched {} activities ({} with nothing to notify), created {} notifications",
        report.dispatched, report.skipped, report.created
    );
    // Only channels some route actually delivers on.
    for channel in app.registry().channels() {
        let pending = app.store().unprocessed(channel).await?;
        println!("{}: {} unprocessed", channel, pending.len());
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
