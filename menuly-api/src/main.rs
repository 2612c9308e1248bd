//! # Menuly API Server
//!
//! Serves the Menuly JSON API in front of the hosted backend.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p menuly-api
//! ```

use menuly_api::{
    app::{build_router, AppState},
    config::Config,
};
use menuly_shared::baas::{ClientContext, SupabaseClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menuly_api=debug,menuly_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Menuly API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    if config.monitoring.sentry_dsn.is_some() {
        tracing::info!("SENTRY_DSN is set; error reporting is handled outside this process");
    }
    if config.admin.api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set; admin endpoints will reject every request");
    }

    let baas = SupabaseClient::for_context(&config.baas, ClientContext::Server)?;
    let bind_address = config.bind_address();

    let state = AppState::new(Arc::new(baas), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
