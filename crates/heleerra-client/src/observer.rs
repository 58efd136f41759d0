//! Client Observers
//!
//! Everything the client and webhook processor have to report goes through a
//! [`PaymentObserver`] handed in at construction. [`TracingObserver`] turns
//! events into `tracing` records; hosts can plug in metrics, audit logs or a
//! recorder for tests instead.

use rust_decimal::Decimal;

use crate::config::Environment;

/// Something worth reporting
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentEvent<'a> {
    ClientInitialized {
        environment: Environment,
    },
    InitiatingPayment {
        reference: &'a str,
    },
    PaymentInitiated {
        reference: &'a str,
        amount: Decimal,
        environment: Environment,
    },
    InitiationFailed {
        reference: &'a str,
        status: u16,
        code: &'a str,
        message: &'a str,
    },
    VerifyingPayment {
        transaction_id: &'a str,
    },
    PaymentVerified {
        transaction_id: &'a str,
        status: Option<&'a str>,
    },
    VerificationFailed {
        transaction_id: &'a str,
        status: u16,
        message: &'a str,
    },
    NetworkError {
        operation: &'static str,
        target: &'a str,
        error: String,
    },
    WebhookSecretMissing,
    SignatureMismatch,
    SignatureError {
        error: String,
    },
    WebhookRejected {
        webhook_id: &'a str,
        environment: &'a str,
    },
    WebhookPayloadInvalid {
        webhook_id: &'a str,
        error: String,
    },
    SandboxWebhook {
        transaction_id: Option<&'a str>,
        status: &'a str,
        amount: Option<Decimal>,
    },
    ProductionWebhook {
        transaction_id: Option<&'a str>,
        status: &'a str,
        amount: Option<Decimal>,
    },
    UnknownStatus {
        status: &'a str,
        transaction_id: Option<&'a str>,
    },
    HandlerFailed {
        status: &'a str,
        transaction_id: Option<&'a str>,
        error: String,
    },
    PaymentCompleted {
        transaction_id: Option<&'a str>,
        amount: Option<Decimal>,
        customer_email: Option<&'a str>,
    },
    PaymentFailed {
        transaction_id: Option<&'a str>,
        reason: &'a str,
    },
    PaymentCancelled {
        transaction_id: Option<&'a str>,
    },
    PaymentExpired {
        transaction_id: Option<&'a str>,
    },
}

impl PaymentEvent<'_> {
    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            PaymentEvent::ClientInitialized { .. } => "client_initialized",
            PaymentEvent::InitiatingPayment { .. } => "initiating_payment",
            PaymentEvent::PaymentInitiated { .. } => "payment_initiated",
            PaymentEvent::InitiationFailed { .. } => "initiation_failed",
            PaymentEvent::VerifyingPayment { .. } => "verifying_payment",
            PaymentEvent::PaymentVerified { .. } => "payment_verified",
            PaymentEvent::VerificationFailed { .. } => "verification_failed",
            PaymentEvent::NetworkError { .. } => "network_error",
            PaymentEvent::WebhookSecretMissing => "webhook_secret_missing",
            PaymentEvent::SignatureMismatch => "signature_mismatch",
            PaymentEvent::SignatureError { .. } => "signature_error",
            PaymentEvent::WebhookRejected { .. } => "webhook_rejected",
            PaymentEvent::WebhookPayloadInvalid { .. } => "webhook_payload_invalid",
            PaymentEvent::SandboxWebhook { .. } => "sandbox_webhook",
            PaymentEvent::ProductionWebhook { .. } => "production_webhook",
            PaymentEvent::UnknownStatus { .. } => "unknown_status",
            PaymentEvent::HandlerFailed { .. } => "handler_failed",
            PaymentEvent::PaymentCompleted { .. } => "payment_completed",
            PaymentEvent::PaymentFailed { .. } => "payment_failed",
            PaymentEvent::PaymentCancelled { .. } => "payment_cancelled",
            PaymentEvent::PaymentExpired { .. } => "payment_expired",
        }
    }
}

/// Event sink injected into the client and webhook processor
pub trait PaymentObserver: Send + Sync {
    fn notify(&self, event: &PaymentEvent<'_>);
}

/// Discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PaymentObserver for NoopObserver {
    fn notify(&self, _event: &PaymentEvent<'_>) {}
}

/// Reports events as structured `tracing` records
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PaymentObserver for TracingObserver {
    fn notify(&self, event: &PaymentEvent<'_>) {
        match event {
            PaymentEvent::ClientInitialized { environment } => {
                tracing::info!(environment = %environment, "Heleerra API client initialized");
            }
            PaymentEvent::InitiatingPayment { reference } => {
                tracing::info!(ref_trx = %reference, "Initiating payment");
            }
            PaymentEvent::PaymentInitiated { reference, amount, environment } => {
                tracing::info!(
                    ref_trx = %reference,
                    amount = %amount,
                    environment = %environment,
                    "Payment initiated successfully"
                );
            }
            PaymentEvent::InitiationFailed { reference, status, code, message } => {
                tracing::error!(
                    ref_trx = %reference,
                    status_code = status,
                    error_code = %code,
                    message = %message,
                    "Payment initiation failed"
                );
            }
            PaymentEvent::VerifyingPayment { transaction_id } => {
                tracing::info!(transaction_id = %transaction_id, "Verifying payment status");
            }
            PaymentEvent::PaymentVerified { transaction_id, status } => {
                tracing::info!(
                    transaction_id = %transaction_id,
                    status = ?status,
                    "Payment verification successful"
                );
            }
            PaymentEvent::VerificationFailed { transaction_id, status, message } => {
                tracing::error!(
                    transaction_id = %transaction_id,
                    status_code = status,
                    message = %message,
                    "Payment verification failed"
                );
            }
            PaymentEvent::NetworkError { operation, target, error } => {
                tracing::error!(
                    operation = %operation,
                    target = %target,
                    error = %error,
                    "Network error calling Heleerra"
                );
            }
            PaymentEvent::WebhookSecretMissing => {
                tracing::warn!("Webhook secret not configured");
            }
            PaymentEvent::SignatureMismatch => {
                tracing::warn!("Webhook signature verification failed");
            }
            PaymentEvent::SignatureError { error } => {
                tracing::error!(error = %error, "Error verifying webhook signature");
            }
            PaymentEvent::WebhookRejected { webhook_id, environment } => {
                tracing::warn!(
                    webhook_id = %webhook_id,
                    environment = %environment,
                    "Rejected webhook with invalid signature"
                );
            }
            PaymentEvent::WebhookPayloadInvalid { webhook_id, error } => {
                tracing::warn!(webhook_id = %webhook_id, error = %error, "Invalid webhook payload");
            }
            PaymentEvent::SandboxWebhook { transaction_id, status, amount } => {
                tracing::info!(
                    transaction_id = ?transaction_id,
                    status = %status,
                    amount = ?amount,
                    "Processing sandbox webhook"
                );
            }
            PaymentEvent::ProductionWebhook { transaction_id, status, amount } => {
                tracing::info!(
                    transaction_id = ?transaction_id,
                    status = %status,
                    amount = ?amount,
                    "Processing production webhook"
                );
            }
            PaymentEvent::UnknownStatus { status, transaction_id } => {
                tracing::warn!(
                    status = %status,
                    transaction_id = ?transaction_id,
                    "Unknown payment status in webhook"
                );
            }
            PaymentEvent::HandlerFailed { status, transaction_id, error } => {
                tracing::error!(
                    status = %status,
                    transaction_id = ?transaction_id,
                    error = %error,
                    "Webhook handler failed"
                );
            }
            PaymentEvent::PaymentCompleted { transaction_id, amount, customer_email } => {
                tracing::info!(
                    transaction_id = ?transaction_id,
                    amount = ?amount,
                    customer_email = ?customer_email,
                    "Payment completed successfully"
                );
            }
            PaymentEvent::PaymentFailed { transaction_id, reason } => {
                tracing::warn!(
                    transaction_id = ?transaction_id,
                    reason = %reason,
                    "Payment failed"
                );
            }
            PaymentEvent::PaymentCancelled { transaction_id } => {
                tracing::info!(transaction_id = ?transaction_id, "Payment cancelled by user");
            }
            PaymentEvent::PaymentExpired { transaction_id } => {
                tracing::info!(transaction_id = ?transaction_id, "Payment session expired");
            }
        }
    }
}
