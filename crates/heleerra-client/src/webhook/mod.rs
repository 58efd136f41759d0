//! Heleerra Webhook Handling
//!
//! ```text
//! raw body + headers
//!        │
//!        ▼
//! ┌──────────────┐  bad signature   ┌──────────────────────────────┐
//! │   Verifier   │─────────────────▶│ {error, "Invalid signature"} │
//! └──────────────┘                  └──────────────────────────────┘
//!        │ ok
//!        ▼
//! ┌──────────────┐  sandbox   ┌──────────────────────────┐
//! │ x-environment│───────────▶│ sandbox_processed (noop) │
//! └──────────────┘            └──────────────────────────┘
//!        │ production
//!        ▼
//!  completed / failed / cancelled / expired ──▶ PaymentEventHandler
//! ```

mod handler;
mod payload;
mod signature;

pub use handler::{LoggingEventHandler, PaymentEventHandler};
pub use payload::{
    ENVIRONMENT_HEADER, PaymentStatus, SIGNATURE_HEADER, WEBHOOK_ID_HEADER, WebhookData,
    WebhookHeaders, WebhookPayload, WebhookResponse,
};
pub use signature::WebhookVerifier;

use std::sync::Arc;

use crate::observer::{PaymentEvent, PaymentObserver, TracingObserver};

/// What happened to a webhook
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Missing or invalid signature; nothing was dispatched
    Rejected,
    /// Signed, but the body is not a webhook payload
    InvalidPayload,
    /// Sandbox webhook, acknowledged without side effects
    Sandbox,
    /// Production webhook handed to its status handler
    Processed(PaymentStatus),
    /// Production webhook with a status no handler covers
    UnknownStatus(String),
    /// The status handler returned an error
    HandlerFailed(PaymentStatus),
}

impl WebhookOutcome {
    pub fn response(&self) -> WebhookResponse {
        match self {
            WebhookOutcome::Rejected => WebhookResponse::error("Invalid signature"),
            WebhookOutcome::InvalidPayload => WebhookResponse::error("Invalid payload"),
            WebhookOutcome::HandlerFailed(_) => WebhookResponse::error("Webhook handler failed"),
            WebhookOutcome::Sandbox => {
                WebhookResponse::new("sandbox_processed", "Webhook processed in sandbox mode")
            }
            WebhookOutcome::Processed(_) | WebhookOutcome::UnknownStatus(_) => {
                WebhookResponse::new("processed", "Webhook processed successfully")
            }
        }
    }
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        outcome.response()
    }
}

/// Verifies and dispatches incoming webhooks
pub struct WebhookProcessor {
    verifier: WebhookVerifier,
    handler: Arc<dyn PaymentEventHandler>,
    observer: Arc<dyn PaymentObserver>,
}

impl WebhookProcessor {
    pub fn new(verifier: WebhookVerifier, handler: Arc<dyn PaymentEventHandler>) -> Self {
        Self {
            verifier,
            handler,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PaymentObserver>) -> Self {
        self.verifier = self.verifier.with_observer(observer.clone());
        self.observer = observer;
        self
    }

    pub fn verifier(&self) -> &WebhookVerifier {
        &self.verifier
    }

    /// Verify and dispatch one webhook, returning the response body.
    pub async fn handle(&self, payload: &str, headers: &WebhookHeaders) -> WebhookResponse {
        self.process(payload, headers).await.response()
    }

    /// Verify and dispatch one webhook.
    ///
    /// Never fails: every problem is folded into the returned outcome so one
    /// bad webhook cannot take down the caller.
    pub async fn process(&self, payload: &str, headers: &WebhookHeaders) -> WebhookOutcome {
        if !self.verifier.verify(payload, headers.signature()) {
            self.observer.notify(&PaymentEvent::WebhookRejected {
                webhook_id: headers.webhook_id(),
                environment: headers.environment(),
            });
            return WebhookOutcome::Rejected;
        }

        let decoded: WebhookPayload = match serde_json::from_str(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.observer.notify(&PaymentEvent::WebhookPayloadInvalid {
                    webhook_id: headers.webhook_id(),
                    error: e.to_string(),
                });
                return WebhookOutcome::InvalidPayload;
            }
        };

        if headers.is_sandbox() {
            self.handle_sandbox(&decoded)
        } else {
            self.handle_production(&decoded).await
        }
    }

    /// Sandbox webhooks never reach the status handlers.
    fn handle_sandbox(&self, payload: &WebhookPayload) -> WebhookOutcome {
        self.observer.notify(&PaymentEvent::SandboxWebhook {
            transaction_id: payload.transaction_id(),
            status: payload.status.as_str(),
            amount: payload.data.amount,
        });
        WebhookOutcome::Sandbox
    }

    async fn handle_production(&self, payload: &WebhookPayload) -> WebhookOutcome {
        self.observer.notify(&PaymentEvent::ProductionWebhook {
            transaction_id: payload.transaction_id(),
            status: payload.status.as_str(),
            amount: payload.data.amount,
        });

        let result = match &payload.status {
            PaymentStatus::Completed => self.handler.on_completed(payload).await,
            PaymentStatus::Failed => self.handler.on_failed(payload).await,
            PaymentStatus::Cancelled => self.handler.on_cancelled(payload).await,
            PaymentStatus::Expired => self.handler.on_expired(payload).await,
            PaymentStatus::Unknown(raw) => {
                self.observer.notify(&PaymentEvent::UnknownStatus {
                    status: raw,
                    transaction_id: payload.transaction_id(),
                });
                return WebhookOutcome::UnknownStatus(raw.clone());
            }
        };

        match result {
            Ok(()) => WebhookOutcome::Processed(payload.status.clone()),
            Err(e) => {
                self.observer.notify(&PaymentEvent::HandlerFailed {
                    status: payload.status.as_str(),
                    transaction_id: payload.transaction_id(),
                    error: format!("{e:#}"),
                });
                WebhookOutcome::HandlerFailed(payload.status.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::testing::RecordingObserver;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SECRET: &str = "whsec_test";

    /// Records which handler ran, optionally failing
    #[derive(Default)]
    struct CountingHandler {
        calls: Mutex<Vec<&'static str>>,
        fail: bool,
    }

    impl CountingHandler {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, name: &'static str) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(name);
            if self.fail {
                anyhow::bail!("order service unavailable");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PaymentEventHandler for CountingHandler {
        async fn on_completed(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
            self.record("completed")
        }

        async fn on_failed(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
            self.record("failed")
        }

        async fn on_cancelled(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
            self.record("cancelled")
        }

        async fn on_expired(&self, _payload: &WebhookPayload) -> anyhow::Result<()> {
            self.record("expired")
        }
    }

    fn processor(handler: Arc<CountingHandler>) -> (WebhookProcessor, Arc<RecordingObserver>) {
        let recorder = Arc::new(RecordingObserver::default());
        let processor = WebhookProcessor::new(WebhookVerifier::new(Some(SECRET.into())), handler)
            .with_observer(recorder.clone());
        (processor, recorder)
    }

    fn headers(
        processor: &WebhookProcessor,
        payload: &str,
        environment: Option<&str>,
    ) -> WebhookHeaders {
        WebhookHeaders {
            signature: processor.verifier().sign(payload),
            environment: environment.map(str::to_string),
            webhook_id: Some("wh_1".into()),
        }
    }

    fn body(status: &str) -> String {
        format!(r#"{{"status":"{status}","data":{{"ref_trx":"T1","amount":10}}}}"#)
    }

    #[tokio::test]
    async fn test_completed_with_valid_signature() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, _) = processor(handler.clone());
        let payload = r#"{"status":"completed","data":{"ref_trx":"T1","amount":10}}"#;

        let response = processor.handle(payload, &headers(&processor, payload, None)).await;

        assert_eq!(response, WebhookResponse::new("processed", "Webhook processed successfully"));
        assert_eq!(handler.calls(), vec!["completed"]);
    }

    #[tokio::test]
    async fn test_wrong_signature_short_circuits() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, recorder) = processor(handler.clone());
        let payload = body("completed");
        let mut headers = headers(&processor, &payload, None);
        headers.signature = Some("0".repeat(64));

        let response = processor.handle(&payload, &headers).await;

        assert_eq!(response, WebhookResponse::error("Invalid signature"));
        assert!(handler.calls().is_empty());
        assert_eq!(recorder.count("webhook_rejected"), 1);
    }

    #[tokio::test]
    async fn test_unsigned_webhook_rejected() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, _) = processor(handler.clone());

        let outcome = processor.process(&body("completed"), &WebhookHeaders::default()).await;

        assert_eq!(outcome, WebhookOutcome::Rejected);
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_secret_rejects_everything() {
        let handler = Arc::new(CountingHandler::default());
        let processor = WebhookProcessor::new(WebhookVerifier::new(None), handler.clone())
            .with_observer(Arc::new(crate::NoopObserver));
        let headers = WebhookHeaders {
            signature: Some("ab".repeat(32)),
            ..Default::default()
        };

        assert_eq!(
            processor.process(&body("completed"), &headers).await,
            WebhookOutcome::Rejected
        );
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_each_status_reaches_exactly_one_handler() {
        for status in ["completed", "failed", "cancelled", "expired"] {
            let handler = Arc::new(CountingHandler::default());
            let (processor, _) = processor(handler.clone());
            let payload = body(status);

            let outcome = processor
                .process(&payload, &headers(&processor, &payload, Some("production")))
                .await;

            assert_eq!(
                outcome,
                WebhookOutcome::Processed(PaymentStatus::from(status.to_string()))
            );
            assert_eq!(handler.calls(), vec![status]);
        }
    }

    #[tokio::test]
    async fn test_sandbox_never_invokes_handlers() {
        for status in ["completed", "failed", "cancelled", "expired", "refunded"] {
            let handler = Arc::new(CountingHandler::default());
            let (processor, recorder) = processor(handler.clone());
            let payload = body(status);

            let response = processor
                .handle(&payload, &headers(&processor, &payload, Some("sandbox")))
                .await;

            assert_eq!(
                response,
                WebhookResponse::new("sandbox_processed", "Webhook processed in sandbox mode")
            );
            assert!(handler.calls().is_empty());
            assert_eq!(recorder.count("sandbox_webhook"), 1);
        }
    }

    #[tokio::test]
    async fn test_unknown_status_is_acknowledged() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, recorder) = processor(handler.clone());
        let payload = body("refunded");

        let outcome = processor.process(&payload, &headers(&processor, &payload, None)).await;

        assert_eq!(outcome, WebhookOutcome::UnknownStatus("refunded".into()));
        assert_eq!(outcome.response().status, "processed");
        assert!(handler.calls().is_empty());
        assert_eq!(recorder.count("unknown_status"), 1);
    }

    #[tokio::test]
    async fn test_non_sandbox_environment_counts_as_production() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, _) = processor(handler.clone());
        let payload = body("expired");

        processor.process(&payload, &headers(&processor, &payload, Some("staging"))).await;

        assert_eq!(handler.calls(), vec!["expired"]);
    }

    #[tokio::test]
    async fn test_numeric_reference_reaches_handler() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, recorder) = processor(handler.clone());
        let payload = r#"{"status":"completed","data":{"ref_trx":12345,"amount":10}}"#;

        let outcome = processor
            .process(payload, &headers(&processor, payload, Some("production")))
            .await;

        assert_eq!(outcome, WebhookOutcome::Processed(PaymentStatus::Completed));
        assert_eq!(handler.calls(), vec!["completed"]);
        assert_eq!(recorder.count("webhook_payload_invalid"), 0);
    }

    #[tokio::test]
    async fn test_loosely_typed_sandbox_webhooks_are_acknowledged() {
        for payload in [
            r#"{"status":"completed","data":{"ref_trx":12345,"amount":10}}"#,
            r#"{"status":null,"data":{"ref_trx":"T1"}}"#,
            r#"{"status":"failed","data":"n/a"}"#,
        ] {
            let handler = Arc::new(CountingHandler::default());
            let (processor, _) = processor(handler.clone());

            let outcome = processor
                .process(payload, &headers(&processor, payload, Some("sandbox")))
                .await;

            assert_eq!(outcome, WebhookOutcome::Sandbox, "{payload}");
            assert!(handler.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_null_status_in_production_is_unknown() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, recorder) = processor(handler.clone());
        let payload = r#"{"status":null,"data":{"ref_trx":"T1","amount":10}}"#;

        let response = processor
            .handle(payload, &headers(&processor, payload, Some("production")))
            .await;

        assert_eq!(response, WebhookResponse::new("processed", "Webhook processed successfully"));
        assert!(handler.calls().is_empty());
        assert_eq!(recorder.count("unknown_status"), 1);
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, _) = processor(handler.clone());
        let payload = r#"["completed"]"#;

        let outcome = processor
            .process(payload, &headers(&processor, payload, Some("sandbox")))
            .await;

        assert_eq!(outcome, WebhookOutcome::InvalidPayload);
    }

    #[tokio::test]
    async fn test_invalid_payload() {
        let handler = Arc::new(CountingHandler::default());
        let (processor, recorder) = processor(handler.clone());
        let payload = "not json";

        let response = processor.handle(payload, &headers(&processor, payload, None)).await;

        assert_eq!(response, WebhookResponse::error("Invalid payload"));
        assert!(handler.calls().is_empty());
        assert_eq!(recorder.count("webhook_payload_invalid"), 1);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_response() {
        let handler = Arc::new(CountingHandler {
            fail: true,
            ..Default::default()
        });
        let (processor, recorder) = processor(handler.clone());
        let payload = body("completed");

        let outcome = processor.process(&payload, &headers(&processor, &payload, None)).await;

        assert_eq!(outcome, WebhookOutcome::HandlerFailed(PaymentStatus::Completed));
        assert_eq!(outcome.response(), WebhookResponse::error("Webhook handler failed"));
        assert_eq!(recorder.count("handler_failed"), 1);
    }
}
