//! Heleerra API Client
//!
//! Thin wrapper over the two REST calls the gateway exposes. Every request
//! carries the environment, merchant key and API key headers; error statuses
//! are turned into [`PaymentError::Api`] with the gateway's own code and
//! message when it sends them.

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{ClientConfig, ConfigSummary};
use crate::error::{Operation, PaymentError, Result};
use crate::observer::{PaymentEvent, PaymentObserver, TracingObserver};
use crate::payment::{PaymentInitiation, PaymentRequest, PaymentVerification};
use crate::webhook::{PaymentEventHandler, WebhookProcessor, WebhookVerifier};

const INITIATE_PATH: &str = "/api/v1/initiate-payment";
const VERIFY_PATH: &str = "/api/v1/verify-payment";

const ENVIRONMENT_HEADER: &str = "x-environment";
const MERCHANT_KEY_HEADER: &str = "x-merchant-key";
const API_KEY_HEADER: &str = "x-api-key";

/// Heleerra gateway client
pub struct HeleerraClient {
    http: Client,
    config: ClientConfig,
    auth_headers: HeaderMap,
    observer: Arc<dyn PaymentObserver>,
}

impl HeleerraClient {
    /// Create a client that reports through `tracing`
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: ClientConfig, observer: Arc<dyn PaymentObserver>) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let auth_headers = auth_headers(&config)?;

        observer.notify(&PaymentEvent::ClientInitialized {
            environment: config.environment,
        });

        Ok(Self {
            http,
            config,
            auth_headers,
            observer,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Masked configuration, safe to expose for debugging
    pub fn config_summary(&self) -> ConfigSummary {
        self.config.summary()
    }

    /// Start a payment and get the hosted payment page back.
    ///
    /// The request is validated first; invalid data never leaves the process.
    pub async fn initiate_payment(&self, request: &PaymentRequest) -> Result<PaymentInitiation> {
        request.validate()?;

        let reference = request.ref_trx.as_str();
        self.observer.notify(&PaymentEvent::InitiatingPayment { reference });

        let url = format!("{}{}", self.config.base_url, INITIATE_PATH);
        let sent = self
            .http
            .post(&url)
            .headers(self.auth_headers.clone())
            .json(request)
            .send()
            .await;
        let response = self.network_result(sent, Operation::Initiate, reference)?;

        let status = response.status();
        if !status.is_success() {
            let (code, message) = error_details(response, Operation::Initiate).await;
            self.observer.notify(&PaymentEvent::InitiationFailed {
                reference,
                status: status.as_u16(),
                code: &code,
                message: &message,
            });
            return Err(PaymentError::Api {
                operation: Operation::Initiate,
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = self.network_result(response.text().await, Operation::Initiate, reference)?;
        let initiation: PaymentInitiation = decode(&body)?;

        self.observer.notify(&PaymentEvent::PaymentInitiated {
            reference,
            amount: request.payment_amount,
            environment: self.config.environment,
        });

        Ok(initiation)
    }

    /// Look up the current status of a transaction
    pub async fn verify_payment(&self, transaction_id: &str) -> Result<PaymentVerification> {
        self.observer.notify(&PaymentEvent::VerifyingPayment { transaction_id });

        let url = verify_url(&self.config.base_url, transaction_id)?;
        let sent = self
            .http
            .get(url)
            .headers(self.auth_headers.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await;
        let response = self.network_result(sent, Operation::Verify, transaction_id)?;

        let status = response.status();
        if !status.is_success() {
            let (code, message) = error_details(response, Operation::Verify).await;
            self.observer.notify(&PaymentEvent::VerificationFailed {
                transaction_id,
                status: status.as_u16(),
                message: &message,
            });
            return Err(PaymentError::Api {
                operation: Operation::Verify,
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = self.network_result(response.text().await, Operation::Verify, transaction_id)?;
        let verification: PaymentVerification = decode(&body)?;

        self.observer.notify(&PaymentEvent::PaymentVerified {
            transaction_id,
            status: verification.status.as_deref(),
        });

        Ok(verification)
    }

    /// Signature check using the configured webhook secret
    pub fn verify_webhook_signature(&self, payload: &str, signature: &str) -> bool {
        self.webhook_verifier().verify(payload, signature)
    }

    pub fn webhook_verifier(&self) -> WebhookVerifier {
        WebhookVerifier::new(self.config.webhook_secret.clone())
            .with_observer(self.observer.clone())
    }

    /// Webhook processor sharing this client's secret and observer
    pub fn webhook_processor(&self, handler: Arc<dyn PaymentEventHandler>) -> WebhookProcessor {
        WebhookProcessor::new(self.webhook_verifier(), handler).with_observer(self.observer.clone())
    }

    /// Report transport failures before handing them back unchanged
    fn network_result<T>(
        &self,
        result: reqwest::Result<T>,
        operation: Operation,
        target: &str,
    ) -> Result<T> {
        result.map_err(|e| {
            self.observer.notify(&PaymentEvent::NetworkError {
                operation: operation.as_str(),
                target,
                error: e.to_string(),
            });
            PaymentError::Network(e)
        })
    }
}

impl std::fmt::Debug for HeleerraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeleerraClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn auth_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let value = |v: &str, name: &str| {
        HeaderValue::from_str(v)
            .map_err(|_| PaymentError::Config(format!("{name} contains invalid header characters")))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(ENVIRONMENT_HEADER),
        HeaderValue::from_static(config.environment.as_str()),
    );
    headers.insert(
        HeaderName::from_static(MERCHANT_KEY_HEADER),
        value(&config.merchant_key, "merchant key")?,
    );
    let mut api_key = value(&config.api_key, "API key")?;
    api_key.set_sensitive(true);
    headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
    Ok(headers)
}

/// Error code and message from a failed response, with defaults when the
/// body is empty or not JSON.
async fn error_details(response: Response, operation: Operation) -> (String, String) {
    let body: Value = response
        .text()
        .await
        .ok()
        .filter(|text| !text.is_empty())
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null);

    let field = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    let code = field("error_code").unwrap_or_else(|| "UNKNOWN_ERROR".into());
    let message = field("message").unwrap_or_else(|| operation.default_message().into());
    (code, message)
}

/// Verify endpoint for `transaction_id`, which always lands in a single
/// percent-encoded path segment.
fn verify_url(base_url: &str, transaction_id: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{base_url}{VERIFY_PATH}"))
        .map_err(|e| PaymentError::Config(format!("invalid base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| PaymentError::Config(format!("base URL '{base_url}' cannot carry a path")))?
        .push(transaction_id);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}
