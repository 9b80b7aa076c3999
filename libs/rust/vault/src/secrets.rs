//! Secret types and Vault response structures

use crate::error::{VaultError, VaultResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field name to value mapping read from one secret path.
pub type SecretValueMap = HashMap<String, SecretValue>;

/// Shape of a single field inside a KV secret.
///
/// Vault stores arbitrary JSON per field; only [`SecretValue::String`] can be
/// projected as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    /// JSON string
    String(String),
    /// JSON number
    Number(serde_json::Number),
    /// JSON boolean
    Bool(bool),
    /// JSON null
    Null,
    /// JSON array
    Array(Vec<Value>),
    /// JSON object
    Object(Map<String, Value>),
}

impl SecretValue {
    /// Borrow the string payload, if this is a string field.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the JSON shape, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Null => "null",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<Value> for SecretValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Null,
            Value::Array(a) => Self::Array(a),
            Value::Object(o) => Self::Object(o),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Generic Vault logical read response.
///
/// Only `data` matters for KV reads; lease fields are ignored.
#[derive(Debug, Deserialize)]
pub struct LogicalResponse {
    /// Payload of the read; absent or null when there is nothing to return
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl LogicalResponse {
    /// Extract the secret fields, unwrapping KV v2 envelopes.
    ///
    /// A KV v2 read returns `{"data": {"data": {...}, "metadata": {...}}}`,
    /// a KV v1 read returns `{"data": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::SecretNotFound`] when the response carries no
    /// data, or when a KV v2 version has been deleted.
    pub fn into_secret_values(self, path: &str) -> VaultResult<SecretValueMap> {
        let mut data = self.data.ok_or_else(|| VaultError::not_found(path))?;

        if data.contains_key("metadata") {
            match data.remove("data") {
                Some(Value::Object(inner)) => return Ok(into_map(inner)),
                Some(Value::Null) => return Err(VaultError::not_found(path)),
                Some(other) => {
                    data.insert("data".to_string(), other);
                }
                None => {}
            }
        }

        Ok(into_map(data))
    }
}

fn into_map(fields: Map<String, Value>) -> SecretValueMap {
    fields
        .into_iter()
        .map(|(k, v)| (k, SecretValue::from(v)))
        .collect()
}

/// Vault `sys/seal-status` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SealStatusResponse {
    /// Seal type, e.g. `shamir`
    pub r#type: String,
    /// Whether Vault has been initialized
    pub initialized: bool,
    /// Whether Vault is sealed
    pub sealed: bool,
    /// Unseal key threshold
    pub t: u32,
    /// Total number of unseal key shares
    pub n: u32,
    /// Unseal keys provided so far
    pub progress: u32,
    /// Nonce of the current unseal attempt
    pub nonce: String,
    /// Vault version
    pub version: String,
    /// Build date of the Vault binary
    pub build_date: String,
    /// Whether a seal migration is in progress
    pub migration: bool,
    /// Cluster name, empty while sealed
    pub cluster_name: String,
    /// Cluster ID, empty while sealed
    pub cluster_id: String,
    /// Whether a recovery seal is in use
    pub recovery_seal: bool,
    /// Storage backend
    pub storage_type: String,
}
