//! Secret store trait
//!
//! The projection pipeline only needs "read the fields at this path"; it is
//! written against this trait so tests can substitute an in-memory store.

use crate::{error::VaultResult, secrets::SecretValueMap};
use async_trait::async_trait;

/// A key-value secret store addressed by path.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read all fields of the secret at `path`.
    ///
    /// Implementations must report a missing authorization for this path as
    /// [`crate::VaultError::PermissionDenied`] and use other variants for
    /// every other failure.
    async fn fetch_secret(&self, path: &str) -> VaultResult<SecretValueMap>;
}

#[async_trait]
impl<S: SecretStore + ?Sized> SecretStore for &S {
    async fn fetch_secret(&self, path: &str) -> VaultResult<SecretValueMap> {
        (**self).fetch_secret(path).await
    }
}
