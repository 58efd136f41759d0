//! Payment Status Handlers
//!
//! Business logic for terminal payment statuses lives in the host
//! application. Implement [`PaymentEventHandler`] to update orders, notify
//! customers or release inventory; every method defaults to doing nothing.

use async_trait::async_trait;
use std::sync::Arc;

use super::payload::WebhookPayload;
use crate::observer::{PaymentEvent, PaymentObserver, TracingObserver};

/// Callbacks for verified production webhooks (Strategy pattern)
#[async_trait]
pub trait PaymentEventHandler: Send + Sync {
    async fn on_completed(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_failed(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_cancelled(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_expired(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Reports each status to the observer and does nothing else
pub struct LoggingEventHandler {
    observer: Arc<dyn PaymentObserver>,
}

impl Default for LoggingEventHandler {
    fn default() -> Self {
        Self::new(Arc::new(TracingObserver))
    }
}

impl LoggingEventHandler {
    pub fn new(observer: Arc<dyn PaymentObserver>) -> Self {
        Self { observer }
    }
}

#[async_trait]
impl PaymentEventHandler for LoggingEventHandler {
    async fn on_completed(&self, payload: &WebhookPayload) -> anyhow::Result<()> {
        self.observer.notify(&PaymentEvent::PaymentCompleted {
            transaction_id: payload.transaction_id(),
            amount: payload.data.amount,
            customer_email: payload.data.customer_email.as_deref(),
        });
        Ok(())
    }

    async fn on_failed(&self, payload: &WebhookPayload) -> anyhow::Result<()> {
        self.observer.notify(&PaymentEvent::PaymentFailed {
            transaction_id: payload.transaction_id(),
            reason: payload.message.as_deref().unwrap_or("Unknown reason"),
        });
        Ok(())
    }

    async fn on_cancelled(&self, payload: &WebhookPayload) -> anyhow::Result<()> {
        self.observer.notify(&PaymentEvent::PaymentCancelled {
            transaction_id: payload.transaction_id(),
        });
        Ok(())
    }

    async fn on_expired(&self, payload: &WebhookPayload) -> anyhow::Result<()> {
        self.observer.notify(&PaymentEvent::PaymentExpired {
            transaction_id: payload.transaction_id(),
        });
        Ok(())
    }
}
