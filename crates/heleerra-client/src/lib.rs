//! # heleerra-client
//!
//! Client library for the Heleerra payment gateway.
//!
//! ## Payment Flow
//!
//! ```text
//! ┌─────────────┐  initiate   ┌─────────────────┐  webhook   ┌─────────────┐
//! │  Your Site  │────────────▶│ Heleerra Hosted │───────────▶│  Your Site  │
//! │  (checkout) │             │  Payment Page   │            │  (webhook)  │
//! └─────────────┘             └─────────────────┘            └─────────────┘
//!        │                                                          │
//!        └──────────── verify-payment/{transaction_id} ◀────────────┘
//! ```
//!
//! 1. [`HeleerraClient::initiate_payment`] validates the [`PaymentRequest`]
//!    and returns the hosted `payment_url` to redirect the customer to.
//! 2. Heleerra posts a signed webhook when the payment reaches a terminal
//!    status. [`WebhookProcessor`] checks the HMAC-SHA256 signature and hands
//!    production webhooks to your [`PaymentEventHandler`].
//! 3. [`HeleerraClient::verify_payment`] looks up a transaction on demand.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use heleerra_client::{ClientConfig, Environment, HeleerraClient, PaymentRequest};
//! use rust_decimal_macros::dec;
//!
//! let config = ClientConfig::new("merchant_123", "api_key_abc", Environment::Sandbox)
//!     .with_webhook_secret("whsec_xxx");
//! let client = HeleerraClient::new(config)?;
//!
//! let payment = client.initiate_payment(
//!     &PaymentRequest::new(dec!(250.00), "USD", "ORDER_42")
//!         .success_redirect("https://yoursite.com/success")
//!         .ipn_url("https://yoursite.com/webhooks/heleerra"),
//! ).await?;
//!
//! // Redirect user to: payment.payment_url
//! ```

mod client;
mod config;
mod error;
mod observer;
mod payment;
pub mod validation;
pub mod webhook;

pub use client::HeleerraClient;
pub use config::{ClientConfig, ConfigSummary, Environment, WebhookSecretDefaults};
pub use error::{Operation, PaymentError, Result};
pub use observer::{NoopObserver, PaymentEvent, PaymentObserver, TracingObserver};
pub use payment::{PaymentInitiation, PaymentRequest, PaymentVerification};
pub use validation::{ValidationError, validate_payment_data};
pub use webhook::{
    LoggingEventHandler, PaymentEventHandler, PaymentStatus, WebhookHeaders, WebhookOutcome,
    WebhookPayload, WebhookProcessor, WebhookResponse, WebhookVerifier,
};
