use tracing::{info, warn};

use ledgerflow_api::app::build_app;
use ledgerflow_infra::submitter::TransportMode;

/// Process configuration, read from the environment once at startup.
struct ApiConfig {
    mode: TransportMode,
    workers: usize,
    bind_addr: String,
}

impl ApiConfig {
    fn from_env() -> Self {
        let mode = match std::env::var("LEDGERFLOW_TRANSPORT") {
            Ok(raw) => match raw.parse() {
                Ok(mode) => mode,
                Err(e) => {
                    warn!(error = %e, "invalid LEDGERFLOW_TRANSPORT, falling back to direct-queue");
                    TransportMode::DirectQueue
                }
            },
            Err(_) => TransportMode::DirectQueue,
        };

        let workers = std::env::var("LEDGERFLOW_WORKERS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(2);

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            mode,
            workers,
            bind_addr,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ledgerflow_observability::init();

    let config = ApiConfig::from_env();

    let (services, _workers) = build_services(config.mode, config.workers).await?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, mode = %config.mode, "api listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "redis")]
async fn build_services(
    mode: TransportMode,
    workers: usize,
) -> anyhow::Result<(
    std::sync::Arc<ledgerflow_api::app::services::AppServices>,
    Vec<ledgerflow_infra::consumer::WorkerHandle>,
)> {
    use anyhow::Context;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let redis_url = std::env::var("REDIS_URL").context("REDIS_URL is not set")?;

    ledgerflow_api::app::services::build_persistent(mode, &database_url, &redis_url, workers).await
}

#[cfg(not(feature = "redis"))]
async fn build_services(
    mode: TransportMode,
    workers: usize,
) -> anyhow::Result<(
    std::sync::Arc<ledgerflow_api::app::services::AppServices>,
    Vec<ledgerflow_infra::consumer::WorkerHandle>,
)> {
    Ok(ledgerflow_api::app::services::build_in_memory(mode, workers))
}
