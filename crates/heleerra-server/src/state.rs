//! Application State

use std::sync::Arc;

use heleerra_client::{HeleerraClient, WebhookProcessor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway client (config summary, payment lookups)
    pub client: Arc<HeleerraClient>,

    /// Verifies and dispatches incoming webhooks
    pub webhooks: Arc<WebhookProcessor>,
}
