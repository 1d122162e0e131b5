use std::env;
use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookshelf_api::app_config::run;
use bookshelf_api::catalog_repository::{CatalogRepository, InMemoryCatalogRepository};

fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "bookshelf_api";

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000);
    let seed_sample_data = env::var("SEED_SAMPLE_DATA")
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or_default();

    let catalog: Arc<dyn CatalogRepository + Send + Sync> = if seed_sample_data {
        Arc::new(
            InMemoryCatalogRepository::with_sample_data()
                .await
                .context("Failed to seed sample data")?,
        )
    } else {
        Arc::new(InMemoryCatalogRepository::default())
    };

    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("starting HTTP server at http://localhost:{}", port);

    run(listener, catalog)?.await.context("Server failed")
}
