// Intake server entry point: configuration, tracing, router, HTTP surface.

use anyhow::Context;
use dotenv::dotenv;
use intake_core::config::AppConfig;
use intake_core::fs_manager::PortablePathManager;
use intake_core::{server, DefaultRouter};
use std::sync::Arc;
use tracing::info;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "intake_core=info,intake_server=info,tower_http=info";

/// Installs the global subscriber. `LOG_FORMAT=json` switches to bunyan output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                env!("CARGO_PKG_NAME").into(),
                std::io::stdout,
            ))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    info!("Intake server starting v{}", env!("CARGO_PKG_VERSION"));

    PortablePathManager::init().context("Failed to create data directory")?;
    let config = AppConfig::from_env().context("Invalid configuration")?;

    let router = Arc::new(
        DefaultRouter::from_config(&config)
            .await
            .context("Failed to initialize agents")?,
    );

    server::serve(router.clone(), &config.server).await?;

    router.memory().close().await;
    info!("Intake server stopped");
    Ok(())
}
