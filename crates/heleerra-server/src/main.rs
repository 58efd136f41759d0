//! Heleerra Webhook Server
//!
//! Axum-based host for the Heleerra webhook endpoint, plus a couple of
//! read-only helper routes.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heleerra_client::{HeleerraClient, LoggingEventHandler};

use crate::handlers::{config_summary, health_check, heleerra_webhook, verify_payment};
use crate::state::AppState;

pub(crate) fn app(state: AppState) -> Router {
    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/config", get(config_summary))

        // Payments
        .route("/api/payments/{transaction_id}", get(verify_payment))
        .route("/webhooks/heleerra", post(heleerra_webhook))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = HeleerraClient::from_env()?;
    let summary = client.config_summary();
    tracing::info!(
        environment = %summary.environment,
        merchant_key = %summary.merchant_key,
        base_url = %summary.base_url,
        "✓ Heleerra client configured"
    );
    if !summary.webhook_configured {
        tracing::warn!("⚠ HELEERRA_WEBHOOK_SECRET not set - every webhook will be rejected");
    }

    let webhooks = client.webhook_processor(Arc::new(LoggingEventHandler::default()));

    let state = AppState {
        client: Arc::new(client),
        webhooks: Arc::new(webhooks),
    };

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 heleerra-server running on http://{}", addr);
    tracing::info!("  GET  /health                 - Health check");
    tracing::info!("  GET  /api/config             - Masked client configuration");
    tracing::info!("  GET  /api/payments/:id       - Verify payment status");
    tracing::info!("  POST /webhooks/heleerra      - Heleerra webhook");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
