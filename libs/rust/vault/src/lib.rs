//! HashiCorp Vault client for vaultctl
//!
//! Reads KV secrets (v1 and v2 mounts) and seal status over the Vault HTTP
//! API. The [`SecretStore`] trait is the seam the projection pipeline is
//! written against.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use provider::SecretStore;
pub use secrets::{SealStatusResponse, SecretValue, SecretValueMap};
