//! Service entry point: configuration, tracing, and the axum server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use yumcha_relay::config::RelayConfig;
use yumcha_relay::dispatch::Dispatcher;
use yumcha_relay::registry::{FallbackOrder, ModelRegistry};
use yumcha_relay::server::{self, AppState};
use yumcha_relay::upstream::HttpUpstream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yumcha_relay=info")),
        )
        .init();

    // Fail fast: a missing credential must prevent startup, not surface on
    // the first request.
    let config = RelayConfig::from_env()?;

    let registry = ModelRegistry::with_defaults();
    let fallback = FallbackOrder::with_defaults(&registry)?;
    let upstream = Arc::new(HttpUpstream::new(&config)?);
    let dispatcher = Dispatcher::new(registry, fallback, upstream);

    let app = server::router(Arc::new(AppState { dispatcher }));
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, base_url = %config.base_url, "relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
