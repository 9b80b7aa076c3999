//! Vault client configuration.

use crate::error::{VaultError, VaultResult};
use std::time::Duration;
use vaultctl_common::HttpConfig;

/// Address used when neither a flag nor `VAULT_ADDR` provides one.
pub const DEFAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub addr: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Skip TLS verification, mirrors `VAULT_SKIP_VERIFY`
    pub skip_verify: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: std::env::var("VAULT_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            skip_verify: std::env::var("VAULT_SKIP_VERIFY")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration for the given address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set TLS verification skipping.
    #[must_use]
    pub const fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Address without trailing slashes.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.addr.trim_end_matches('/')
    }

    /// Check that the address is usable.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] when the address is empty or is
    /// not an `http(s)://` URL.
    pub fn validate(&self) -> VaultResult<()> {
        let addr = self.base_url();
        if addr.is_empty() {
            return Err(VaultError::InvalidConfig("Vault address is empty".into()));
        }
        if !(addr.starts_with("https://") || addr.starts_with("http://")) {
            return Err(VaultError::InvalidConfig(format!(
                "Vault address must start with http:// or https://: {addr}"
            )));
        }
        Ok(())
    }

    /// HTTP settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default()
            .with_timeout(self.timeout)
            .with_connect_timeout(self.connect_timeout)
            .with_accept_invalid_certs(self.skip_verify)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "yes"
    )
}
