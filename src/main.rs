//! ThronesBot - Slack assistant for A Game of Thrones: The Card Game
//!
//! Watches a Slack channel for `[[...]]` commands and answers with card
//! details, pack listings and the upcoming release schedule.

mod bot;
mod catalog;
mod common;
mod config;
mod slack;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};

use bot::{CommandDispatcher, HttpReleaseSource, ResponseBuilder};
use catalog::fetch_catalog;
use config::{env::get_config_path, load_and_validate};
use slack::{Session, SlackTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("ThronesBot v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See thronesbot.conf.example for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Channel: #{}", config.slack.channel);
    info!("  Username: {}", config.slack.username);
    info!("  Cards: {}", config.catalog.cards_url);
    info!("  Schedule: {}", config.schedule.url);

    let timeout = config.session.http_timeout();

    // The catalog is loaded once; without it there is nothing to serve
    let catalog = fetch_catalog(&config.catalog, timeout).await.map_err(|e| {
        error!("Failed to load card catalog: {}", e);
        e
    })?;
    info!("Loaded {} cards", catalog.len());

    let schedule = HttpReleaseSource::new(&config.schedule, timeout)?;
    let responses = ResponseBuilder::new(config.catalog.site_url.clone());
    let dispatcher = CommandDispatcher::new(
        catalog,
        schedule,
        responses,
        config.slack.channel.clone(),
        config.schedule.root_collection.clone(),
    )?;

    let transport = SlackTransport::new(&config.slack, timeout)?;
    let mut session = Session::new(transport, dispatcher, config.session.clone());

    info!("Starting Slack session...");
    tokio::select! {
        _ = session.run() => {}
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
