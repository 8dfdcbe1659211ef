mod ats;
mod config;
mod errors;
mod llm_client;
mod rate_limit;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ats::scanner::ScannerConfig;
use crate::config::Config;
use crate::llm_client::build_backend;
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Completion backend is only needed by the generative scanner
    let backend = match &config.scanner {
        ScannerConfig::Generative(generative) => {
            let backend = build_backend(&config.backend)?;
            info!(
                "Completion backend initialized ({}, model: {})",
                backend.name(),
                generative.model
            );
            Some(backend)
        }
        _ => None,
    };

    let scanner = config.scanner.build(backend)?;
    info!(
        "Scanner initialized: {} (fan-out {}, timeout {:?})",
        scanner.backend_name(),
        config.batch.max_concurrency,
        config.batch.timeout
    );

    // Build app state
    let state = AppState {
        scanner,
        batch: config.batch,
        rate_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
