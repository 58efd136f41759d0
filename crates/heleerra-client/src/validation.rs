//! Payment Data Validation
//!
//! Checks outbound payment fields before anything is sent to the gateway.
//! The rules run either on a raw JSON mapping (as received from a form or
//! another service) or on a typed [`PaymentRequest`](crate::PaymentRequest).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Number, Value};
use std::str::FromStr;
use thiserror::Error;

/// Smallest amount the gateway accepts
pub const MIN_AMOUNT: Decimal = dec!(1.00);

/// Fields every payment must carry, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 3] = ["payment_amount", "currency_code", "ref_trx"];

/// Optional redirect/notification URL fields
pub const URL_FIELDS: [&str; 4] = ["success_redirect", "failure_url", "cancel_redirect", "ipn_url"];

/// Validation failures, raised before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing or empty")]
    MissingField(String),

    #[error("Payment amount must be a number and at least 1.00")]
    InvalidAmount,

    #[error("Currency code must be a 3-letter code (e.g., USD)")]
    InvalidCurrency,

    #[error("{0} must be a valid URL")]
    InvalidUrl(String),
}

/// Validate a payment-data mapping.
pub fn validate_payment_data(data: &Map<String, Value>) -> Result<(), ValidationError> {
    for field in REQUIRED_FIELDS {
        if !data.get(field).is_some_and(is_present) {
            return Err(ValidationError::MissingField(field.to_string()));
        }
    }

    match data.get("payment_amount") {
        Some(Value::Number(amount)) => check_number(amount)?,
        _ => return Err(ValidationError::InvalidAmount),
    }

    match data.get("currency_code") {
        Some(Value::String(code)) => check_currency(code)?,
        _ => return Err(ValidationError::InvalidCurrency),
    }

    for field in URL_FIELDS {
        match data.get(field) {
            Some(Value::String(url)) => check_url(field, url)?,
            Some(other) if is_present(other) => {
                return Err(ValidationError::InvalidUrl(field.to_string()));
            }
            _ => {}
        }
    }

    Ok(())
}

pub fn check_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < MIN_AMOUNT {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

pub fn check_currency(code: &str) -> Result<(), ValidationError> {
    if code.chars().count() != 3 || !code.chars().all(char::is_alphabetic) {
        return Err(ValidationError::InvalidCurrency);
    }
    Ok(())
}

/// Empty URLs count as "not provided".
pub fn check_url(field: &str, url: &str) -> Result<(), ValidationError> {
    if !url.is_empty() && !url.starts_with("http") {
        return Err(ValidationError::InvalidUrl(field.to_string()));
    }
    Ok(())
}

/// A value is present unless it is null, false, zero or empty.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Only JSON numbers count as amounts; numeric strings and booleans never
/// reach this check.
fn check_number(amount: &Number) -> Result<(), ValidationError> {
    let text = amount.to_string();
    match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        Ok(amount) => check_amount(amount),
        // Outside Decimal's range, so far from the minimum either way
        Err(_) if amount.as_f64().is_some_and(|f| f >= 1.0) => Ok(()),
        Err(_) => Err(ValidationError::InvalidAmount),
    }
}
