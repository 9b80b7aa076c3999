//! Vault HTTP client for KV reads and seal status.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    provider::SecretStore,
    secrets::{LogicalResponse, SealStatusResponse, SecretValueMap},
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use vaultctl_common::build_http_client;

/// Header carrying the Vault token.
const TOKEN_HEADER: &str = "X-Vault-Token";

/// Vault client bound to one address and, optionally, one token.
#[derive(Debug, Clone)]
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
    token: Option<SecretString>,
}

impl VaultClient {
    /// Create a new Vault client without a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        let http = build_http_client(&config.http_config()).map_err(VaultError::Http)?;

        Ok(Self {
            config,
            http,
            token: None,
        })
    }

    /// Attach the token sent with every authenticated request.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Address this client talks to.
    #[must_use]
    pub fn address(&self) -> &str {
        self.config.base_url()
    }

    /// Read the seal status. Does not require a token.
    ///
    /// # Errors
    ///
    /// Returns an error if Vault cannot be reached or answers with a
    /// non-success status.
    #[instrument(skip(self), fields(addr = %self.address()))]
    pub async fn seal_status(&self) -> VaultResult<SealStatusResponse> {
        self.request(Method::GET, "sys/seal-status", false).await
    }

    /// Read the fields of a KV secret.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::PermissionDenied`] on 403, and other variants
    /// for missing secrets, unreachable servers and malformed payloads.
    #[instrument(skip(self))]
    pub async fn read_secret(&self, path: &str) -> VaultResult<SecretValueMap> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(VaultError::InvalidPath("empty secret path".into()));
        }

        debug!("Reading secret");
        let response: LogicalResponse = self
            .request(Method::GET, &encode_vault_path(trimmed), true)
            .await
            .map_err(|e| match e {
                VaultError::PermissionDenied(_) => VaultError::permission_denied(path),
                VaultError::SecretNotFound(_) => VaultError::not_found(path),
                other => other,
            })?;

        response.into_secret_values(path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        authenticated: bool,
    ) -> VaultResult<T> {
        let url = format!("{}/v1/{}", self.config.base_url(), path);
        let mut request = self.http.request(method, &url).header("Accept", "application/json");

        if authenticated {
            let token = self
                .token
                .as_ref()
                .ok_or_else(|| VaultError::auth_failed("No token available"))?;
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            403 => return Err(VaultError::permission_denied(path)),
            404 => return Err(VaultError::not_found(path)),
            _ if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                warn!(%status, path, "Vault request failed");
                return Err(VaultError::unavailable(format!("Status {status}: {}", text.trim())));
            }
            _ => {}
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(VaultError::from)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn fetch_secret(&self, path: &str) -> VaultResult<SecretValueMap> {
        self.read_secret(path).await
    }
}

/// Percent-encode a single URL path component.
fn percent_encode_component(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0F)]));
        }
    }
    out
}

/// Percent-encode each segment of a slash-delimited Vault path.
fn encode_vault_path(path: &str) -> String {
    path.split('/')
        .map(percent_encode_component)
        .collect::<Vec<_>>()
        .join("/")
}
