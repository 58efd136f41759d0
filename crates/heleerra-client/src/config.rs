//! Client Configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PaymentError, Result};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://heleerra.com";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway environment, sent on every request as `X-Environment`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            _ => Err(PaymentError::Config(
                "Environment must be either 'sandbox' or 'production'".into(),
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback webhook secrets per environment.
///
/// Only applied through [`ClientConfig::with_default_webhook_secret`], never
/// implicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookSecretDefaults {
    pub sandbox: String,
    pub production: String,
}

impl Default for WebhookSecretDefaults {
    fn default() -> Self {
        Self {
            sandbox: "test_webhook_secret".into(),
            production: "webhook_secret".into(),
        }
    }
}

impl WebhookSecretDefaults {
    pub fn for_environment(&self, environment: Environment) -> &str {
        match environment {
            Environment::Sandbox => &self.sandbox,
            Environment::Production => &self.production,
        }
    }
}

/// Heleerra client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Merchant ID from the Heleerra dashboard
    pub merchant_key: String,

    /// API key from the Heleerra dashboard
    pub api_key: String,

    pub environment: Environment,

    /// Shared secret for webhook signatures (None = every webhook is rejected)
    pub webhook_secret: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// API host, without trailing slash
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(
        merchant_key: impl Into<String>,
        api_key: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            merchant_key: merchant_key.into(),
            api_key: api_key.into(),
            environment,
            webhook_secret: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create from `HELEERRA_*` variables resolved through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| PaymentError::Config(format!("{name} not set")))
        };
        let merchant_key = required("HELEERRA_MERCHANT_KEY")?;
        let api_key = required("HELEERRA_API_KEY")?;
        let environment = match lookup("HELEERRA_ENVIRONMENT") {
            Some(environment) => environment.parse::<Environment>()?,
            None => Environment::Sandbox,
        };
        let timeout = match lookup("HELEERRA_TIMEOUT_SECS") {
            Some(secs) => secs.trim().parse().map_err(|_| {
                PaymentError::Config(format!("invalid HELEERRA_TIMEOUT_SECS: {secs}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(merchant_key, api_key, environment)
            .with_timeout(Duration::from_secs(timeout));
        config.webhook_secret = lookup("HELEERRA_WEBHOOK_SECRET").filter(|s| !s.is_empty());
        if let Some(base_url) = lookup("HELEERRA_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Fill in the webhook secret from `defaults` if none was configured
    pub fn with_default_webhook_secret(mut self, defaults: &WebhookSecretDefaults) -> Self {
        if self.webhook_secret.is_none() {
            self.webhook_secret = Some(defaults.for_environment(self.environment).to_string());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Safe-to-log view of this configuration
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            environment: self.environment,
            base_url: self.base_url.clone(),
            merchant_key: mask_key(&self.merchant_key),
            webhook_configured: self.webhook_secret.is_some(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("merchant_key", &mask_key(&self.merchant_key))
            .field("api_key", &"***")
            .field("environment", &self.environment)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration with credentials masked (for debugging endpoints and logs)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub environment: Environment,
    pub base_url: String,
    pub merchant_key: String,
    pub webhook_configured: bool,
}

/// Keep the first 8 characters
fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(8).collect();
    format!("{visible}...")
}
