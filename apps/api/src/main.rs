use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use careerwise_api::config::Config;
use careerwise_api::gateway::BackendGateway;
use careerwise_api::routes::{build_router, cors_layer};
use careerwise_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("careerwise_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerWise API v{}", env!("CARGO_PKG_VERSION"));

    let gateway = BackendGateway::new(&config.backend_url, config.backend_timeout)?;
    match config.backend_timeout {
        Some(timeout) => info!(
            "Backend gateway: {} (timeout {}s)",
            gateway.base_url(),
            timeout.as_secs()
        ),
        None => info!("Backend gateway: {} (no timeout)", gateway.base_url()),
    }

    let state = AppState {
        backend: Arc::new(gateway),
        config: config.clone(),
    };

    let cors = cors_layer(&config.cors_origins)?;
    info!("CORS origins: {}", config.cors_origins.join(", "));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
