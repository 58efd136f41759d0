//! Payment Error Types

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Which gateway call produced an API error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Initiate,
    Verify,
}

impl Operation {
    /// Message used when the gateway gives no error message of its own
    pub fn default_message(self) -> &'static str {
        match self {
            Operation::Initiate => "Payment initiation failed",
            Operation::Verify => "Payment verification failed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Initiate => "initiate",
            Operation::Verify => "verify",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Payment data rejected before any network call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Gateway answered with an error status
    #[error("{}: {message}", .operation.default_message())]
    Api {
        operation: Operation,
        status: u16,
        code: String,
        message: String,
    },

    /// Transport-level failure, passed through unchanged
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Gateway body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Network(e) => e.is_timeout() || e.is_connect(),
            PaymentError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Validation(_) => "The payment details are invalid.",
            PaymentError::Api { message, .. } => message,
            PaymentError::Network(_) => "Could not reach the payment gateway. Please try again.",
            PaymentError::Config(_) => "Service configuration error.",
            PaymentError::Serialization(_) => "An error occurred processing your request.",
        }
    }
}
