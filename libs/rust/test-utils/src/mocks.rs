//! Mock implementations for testing.
//!
//! [`MockSecretStore`] answers fetches from a fixed table and records every
//! path it was asked for, in order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vaultctl_vault::{SecretStore, SecretValue, SecretValueMap, VaultError, VaultResult};

/// What the mock store answers for one path.
#[derive(Debug, Clone)]
pub enum MockEntry {
    /// Return these fields
    Values(SecretValueMap),
    /// Fail with `PermissionDenied`
    Denied,
    /// Fail with `Unavailable` and the given message
    Unavailable(String),
}

/// In-memory secret store for pipeline tests.
///
/// Paths with no entry fail with `SecretNotFound`.
#[derive(Debug, Default, Clone)]
pub struct MockSecretStore {
    entries: HashMap<String, MockEntry>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockSecretStore {
    /// Create an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret made of string fields.
    #[must_use]
    pub fn with_secret<'a>(
        mut self,
        path: &str,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let values = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), SecretValue::from(v)))
            .collect();
        self.entries.insert(path.to_string(), MockEntry::Values(values));
        self
    }

    /// Add a secret with arbitrary field shapes.
    #[must_use]
    pub fn with_values(mut self, path: &str, values: SecretValueMap) -> Self {
        self.entries.insert(path.to_string(), MockEntry::Values(values));
        self
    }

    /// Make reads of `path` fail with permission denied.
    #[must_use]
    pub fn with_denied(mut self, path: &str) -> Self {
        self.entries.insert(path.to_string(), MockEntry::Denied);
        self
    }

    /// Make reads of `path` fail as if Vault were down.
    #[must_use]
    pub fn with_unavailable(mut self, path: &str, msg: &str) -> Self {
        self.entries
            .insert(path.to_string(), MockEntry::Unavailable(msg.to_string()));
        self
    }

    /// Paths fetched so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of fetches so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn fetch_secret(&self, path: &str) -> VaultResult<SecretValueMap> {
        self.calls.write().await.push(path.to_string());

        match self.entries.get(path) {
            Some(MockEntry::Values(values)) => Ok(values.clone()),
            Some(MockEntry::Denied) => Err(VaultError::permission_denied(path)),
            Some(MockEntry::Unavailable(msg)) => Err(VaultError::unavailable(msg.clone())),
            None => Err(VaultError::not_found(path)),
        }
    }
}
