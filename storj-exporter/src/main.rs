/*!
 * STORJ EXPORTER - entry point
 *
 * Loads the configuration, builds the upstream client and the collectors,
 * then serves the scrape endpoint until SIGINT/SIGTERM.
 */

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use storj_exporter::http::{build_router, AppState};
use storj_exporter::shutdown::shutdown_signal;
use storj_exporter::{build_collectors, logging, ApiClient, ExporterConfig, NodeApi, ScrapeRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = ExporterConfig::load().context("invalid configuration")?;
    logging::init(&config.log_level);

    let client = ApiClient::from_config(&config).context("failed to build the storage node API client")?;
    info!(
        upstream = client.api_url(),
        timeout_secs = config.api_timeout_secs,
        retries = config.api_retries,
        "storage node API client ready"
    );

    let api: Arc<dyn NodeApi> = Arc::new(client);
    let registry = Arc::new(ScrapeRegistry::new(build_collectors(&config, api)));
    info!(collectors = ?registry.collector_names(), "collectors enabled");

    let app = build_router(AppState { registry });

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("exporter stopped");
    Ok(())
}
