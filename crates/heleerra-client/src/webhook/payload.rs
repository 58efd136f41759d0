//! Webhook Payloads, Headers and Responses

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const ENVIRONMENT_HEADER: &str = "x-environment";
pub const WEBHOOK_ID_HEADER: &str = "x-webhook-id";

/// Payment status carried by a webhook
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Completed,
    Failed,
    Cancelled,
    Expired,
    /// Anything else, with the raw value kept
    Unknown(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Unknown(_))
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unknown("unknown".into())
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            "cancelled" => PaymentStatus::Cancelled,
            "expired" => PaymentStatus::Expired,
            _ => PaymentStatus::Unknown(s),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction details inside a webhook.
///
/// Decoding never fails on a field's type: a numeric `ref_trx` becomes its
/// string form and mistyped fields read as absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebhookData {
    /// Merchant reference the payment was initiated with
    #[serde(default, deserialize_with = "lenient::reference")]
    pub ref_trx: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub amount: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub customer_email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decoded webhook body. Only a body that is not a JSON object fails to
/// decode.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Missing or null reads as "unknown"
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: PaymentStatus,

    /// Failure reason, when the gateway gives one
    #[serde(default, deserialize_with = "lenient::optional")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "lenient::data")]
    pub data: WebhookData,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookPayload {
    pub fn transaction_id(&self) -> Option<&str> {
        self.data.ref_trx.as_deref()
    }
}

mod lenient {
    use serde::Deserialize;
    use serde::de::{DeserializeOwned, Deserializer};
    use serde_json::Value;

    use super::{PaymentStatus, WebhookData};

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    pub fn status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PaymentStatus, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => PaymentStatus::from(raw),
            Value::Null => PaymentStatus::default(),
            other => PaymentStatus::Unknown(other.to_string()),
        })
    }

    pub fn reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(reference) => Some(reference),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn data<'de, D: Deserializer<'de>>(deserializer: D) -> Result<WebhookData, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

/// Headers that accompany a webhook
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub signature: Option<String>,
    pub environment: Option<String>,
    pub webhook_id: Option<String>,
}

impl WebhookHeaders {
    /// Pick the webhook headers out of arbitrary (name, value) pairs.
    /// Names are matched case-insensitively.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let name = name.as_ref();
            if name.eq_ignore_ascii_case(SIGNATURE_HEADER) {
                headers.signature = Some(value.into());
            } else if name.eq_ignore_ascii_case(ENVIRONMENT_HEADER) {
                headers.environment = Some(value.into());
            } else if name.eq_ignore_ascii_case(WEBHOOK_ID_HEADER) {
                headers.webhook_id = Some(value.into());
            }
        }
        headers
    }

    pub fn signature(&self) -> &str {
        self.signature.as_deref().unwrap_or_default()
    }

    /// Defaults to "production" when the header is absent
    pub fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or("production")
    }

    pub fn webhook_id(&self) -> &str {
        self.webhook_id.as_deref().unwrap_or_default()
    }

    pub fn is_sandbox(&self) -> bool {
        self.environment() == "sandbox"
    }
}

/// Result object handed back to the webhook sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
}

impl WebhookResponse {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("error", message)
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}
