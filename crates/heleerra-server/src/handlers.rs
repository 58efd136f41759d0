//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use heleerra_client::{
    ConfigSummary, PaymentError, PaymentVerification, WebhookHeaders, WebhookOutcome,
    WebhookResponse,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: &'static str,
    pub webhook_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.client.config().environment.as_str(),
        webhook_configured: state.webhooks.verifier().is_configured(),
    })
}

/// Masked client configuration
pub async fn config_summary(State(state): State<AppState>) -> Json<ConfigSummary> {
    Json(state.client.config_summary())
}

/// Look up a payment on the gateway
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<PaymentVerification>, (StatusCode, Json<ErrorResponse>)> {
    state
        .client
        .verify_payment(&transaction_id)
        .await
        .map(Json)
        .map_err(|e| {
            let (status, code) = match &e {
                PaymentError::Api { status, code, .. } => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    code.clone(),
                ),
                PaymentError::Network(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_UNREACHABLE".into()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "VERIFY_ERROR".into()),
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.user_message().into(),
                    code,
                }),
            )
        })
}

/// Heleerra webhook endpoint
pub async fn heleerra_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<WebhookResponse>) {
    let headers = webhook_headers(&headers);
    let outcome = state.webhooks.process(&body, &headers).await;
    (status_for(&outcome), Json(outcome.response()))
}

fn webhook_headers(headers: &HeaderMap) -> WebhookHeaders {
    WebhookHeaders::from_pairs(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
    )
}

fn status_for(outcome: &WebhookOutcome) -> StatusCode {
    match outcome {
        WebhookOutcome::Rejected => StatusCode::UNAUTHORIZED,
        WebhookOutcome::InvalidPayload => StatusCode::BAD_REQUEST,
        WebhookOutcome::HandlerFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        WebhookOutcome::Sandbox
        | WebhookOutcome::Processed(_)
        | WebhookOutcome::UnknownStatus(_) => StatusCode::OK,
    }
}
