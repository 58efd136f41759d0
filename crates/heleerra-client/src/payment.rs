//! Payment Requests and Gateway Responses

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::validation::{self, ValidationError};

/// Request to initiate a hosted payment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount to charge (at least 1.00)
    #[serde(with = "rust_decimal::serde::float")]
    pub payment_amount: Decimal,

    /// ISO 4217 currency code (e.g. "USD")
    pub currency_code: String,

    /// Merchant reference for this payment attempt
    pub ref_trx: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where the customer lands after paying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_redirect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_redirect: Option<String>,

    /// Webhook (instant payment notification) URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipn_url: Option<String>,

    /// Any other fields the gateway accepts (customer details, metadata, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentRequest {
    pub fn new(
        payment_amount: Decimal,
        currency_code: impl Into<String>,
        ref_trx: impl Into<String>,
    ) -> Self {
        Self {
            payment_amount,
            currency_code: currency_code.into(),
            ref_trx: ref_trx.into(),
            description: None,
            success_redirect: None,
            failure_url: None,
            cancel_redirect: None,
            ipn_url: None,
            extra: Map::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn success_redirect(mut self, url: impl Into<String>) -> Self {
        self.success_redirect = Some(url.into());
        self
    }

    pub fn failure_url(mut self, url: impl Into<String>) -> Self {
        self.failure_url = Some(url.into());
        self
    }

    pub fn cancel_redirect(mut self, url: impl Into<String>) -> Self {
        self.cancel_redirect = Some(url.into());
        self
    }

    pub fn ipn_url(mut self, url: impl Into<String>) -> Self {
        self.ipn_url = Some(url.into());
        self
    }

    /// Attach an extra field passed through to the gateway as-is
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Validate a raw mapping, then decode it.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ValidationError::MissingField("payment_amount".into()).into());
        };
        validation::validate_payment_data(&map)?;
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Apply the same rules as [`validation::validate_payment_data`].
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.payment_amount.is_zero() {
            return Err(ValidationError::MissingField("payment_amount".into()));
        }
        if self.currency_code.is_empty() {
            return Err(ValidationError::MissingField("currency_code".into()));
        }
        if self.ref_trx.is_empty() {
            return Err(ValidationError::MissingField("ref_trx".into()));
        }

        validation::check_amount(self.payment_amount)?;
        validation::check_currency(&self.currency_code)?;

        let urls = [
            ("success_redirect", &self.success_redirect),
            ("failure_url", &self.failure_url),
            ("cancel_redirect", &self.cancel_redirect),
            ("ipn_url", &self.ipn_url),
        ];
        for (field, url) in urls {
            if let Some(url) = url {
                validation::check_url(field, url)?;
            }
        }

        Ok(())
    }
}

/// Gateway answer to a payment initiation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentInitiation {
    /// Hosted payment page to redirect the customer to
    #[serde(default)]
    pub payment_url: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Gateway answer to a payment status lookup
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentVerification {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentVerification {
    /// Look up a field the typed struct does not name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
