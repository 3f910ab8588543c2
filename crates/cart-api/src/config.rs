//! Cart API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_API_HOST` - Bind address (default: 127.0.0.1)
//! - `CART_API_PORT` - Listen port (default: 3000)
//! - `CART_API_BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: `http://localhost:3000`)
//! - `CART_API_CURRENCY` - Cart currency (default: USD)
//! - `CART_API_SESSION_EXPIRY_SECS` - Session inactivity expiry (default: 7 days)
//! - `CART_API_CART_IDLE_SECS` - Idle time before a stored cart is evicted
//!   (default: 1 day)
//! - `CART_API_FLAT_RATE` - Flat-rate shipping fee per unit (default: 5.00)
//! - `CART_API_FREE_SHIPPING_THRESHOLD` - Subtotal for free shipping
//!   (default: 100.00)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use cart_api_core::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::ShippingConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Currency of new carts
    pub currency: CurrencyCode,
    /// Session inactivity expiry
    pub session_expiry: Duration,
    /// Idle time before a stored cart is evicted
    pub cart_idle: Duration,
    /// Shipping carrier settings
    pub shipping: ShippingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            host: parse(&get, "CART_API_HOST", "127.0.0.1")?,
            port: parse(&get, "CART_API_PORT", "3000")?,
            base_url: get("CART_API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            currency: parse(&get, "CART_API_CURRENCY", "USD")?,
            session_expiry: Duration::from_secs(parse(
                &get,
                "CART_API_SESSION_EXPIRY_SECS",
                "604800",
            )?),
            cart_idle: Duration::from_secs(parse(&get, "CART_API_CART_IDLE_SECS", "86400")?),
            shipping: ShippingConfig {
                flat_rate: parse::<Decimal>(&get, "CART_API_FLAT_RATE", "5.00")?,
                free_shipping_threshold: parse::<Decimal>(
                    &get,
                    "CART_API_FREE_SHIPPING_THRESHOLD",
                    "100.00",
                )?,
            },
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked secure.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = get(name).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.session_expiry, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.shipping.flat_rate, Decimal::new(500, 2));
        assert_eq!(config.shipping.free_shipping_threshold, Decimal::new(100, 0));
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_PORT", "8080"),
            ("CART_API_CURRENCY", "eur"),
            ("CART_API_BASE_URL", "https://cart.example.com"),
            ("CART_API_FLAT_RATE", "7.5"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert!(config.is_secure());
        assert_eq!(config.shipping.flat_rate, Decimal::new(75, 1));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_value_names_the_variable() {
        let err = load(&[("CART_API_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("CART_API_PORT"));

        let err = load(&[("CART_API_CURRENCY", "XYZ")]).unwrap_err();
        assert!(err.to_string().contains("CART_API_CURRENCY"));
    }
}
