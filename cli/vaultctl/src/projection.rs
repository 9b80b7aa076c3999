//! Secret projection pipeline.
//!
//! Resolves a context, reads each of its secrets in declaration order and
//! turns the selected keys into [`ExportPair`]s.
//!
//! Failure policy:
//! - a secret the token may not read is skipped with a warning;
//! - any other read failure aborts the whole run;
//! - a key that is missing or not a string is skipped with a warning;
//! - a value that fails base64 decoding is emitted undecoded with a warning.

use crate::{
    context::{Context, ContextLoader, Key},
    error::{Result, VaultctlError},
    output::{ExportPair, OutputMode},
    token::TokenProvider,
    transform,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use vaultctl_vault::{SecretStore, SecretValueMap, VaultClient, VaultConfig};

/// Non-fatal condition met while projecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionWarning {
    /// The token may not read this secret; none of its keys were emitted
    NotAuthorized {
        /// Secret path
        path: String,
    },
    /// The key is absent from the secret or is not a string
    MissingKey {
        /// Field name
        key: String,
        /// Secret path
        path: String,
    },
    /// The value was emitted undecoded
    DecodeFailed {
        /// Field name
        key: String,
        /// Decoder error
        reason: String,
    },
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthorized { path } => write!(f, "Not authorized to read secret: {path}"),
            Self::MissingKey { key, path } => write!(f, "Key {key} not found in secret {path}"),
            Self::DecodeFailed { key, reason } => {
                write!(f, "Failed to base64 decode {key}: {reason}")
            }
        }
    }
}

/// Result of a projection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Emitted pairs in declaration order
    pub pairs: Vec<ExportPair>,
    /// Warnings in the order they were raised
    pub warnings: Vec<ProjectionWarning>,
}

impl Projection {
    /// Render every pair as one output line.
    #[must_use]
    pub fn lines(&self, mode: OutputMode) -> Vec<String> {
        self.pairs.iter().map(|pair| pair.render(mode)).collect()
    }

    fn warn(&mut self, warning: ProjectionWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Project every secret of `context` from `store`.
///
/// # Errors
///
/// Returns [`VaultctlError::Fetch`] for the first read failure that is not
/// a permission denial. No later secret is read after that.
#[instrument(skip_all, fields(context = %context.name))]
pub async fn project_context<S>(context: &Context, store: &S) -> Result<Projection>
where
    S: SecretStore + ?Sized,
{
    let mut projection = Projection::default();

    for secret in &context.secrets {
        debug!(secret = %secret.name, path = %secret.path, "Fetching secret");
        let values = match store.fetch_secret(&secret.path).await {
            Ok(values) => values,
            Err(e) if e.is_permission_denied() => {
                projection.warn(ProjectionWarning::NotAuthorized {
                    path: secret.path.clone(),
                });
                continue;
            }
            Err(source) => {
                return Err(VaultctlError::Fetch {
                    path: secret.path.clone(),
                    source,
                });
            }
        };

        for key in &secret.keys {
            project_key(key, &secret.path, &values, &mut projection);
        }
    }

    Ok(projection)
}

fn project_key(key: &Key, path: &str, values: &SecretValueMap, projection: &mut Projection) {
    let Some(raw) = values.get(&key.name).and_then(|v| v.as_str()) else {
        if let Some(value) = values.get(&key.name) {
            debug!(key = %key.name, kind = value.kind(), "Skipping non-string field");
        }
        projection.warn(ProjectionWarning::MissingKey {
            key: key.name.clone(),
            path: path.to_string(),
        });
        return;
    };

    let value = if key.base64_decode {
        transform::decode_value(raw).unwrap_or_else(|e| {
            projection.warn(ProjectionWarning::DecodeFailed {
                key: key.name.clone(),
                reason: e.to_string(),
            });
            raw.to_string()
        })
    } else {
        raw.to_string()
    };

    projection
        .pairs
        .push(ExportPair::new(key.effective_export_name(), value));
}

/// Inputs of one projection run.
#[derive(Debug, Clone)]
pub struct ProjectionRequest {
    /// Context to resolve
    pub context: String,
    /// Contexts file override
    pub context_file: Option<PathBuf>,
    /// Output mode used by [`Projector::project_lines`]
    pub mode: OutputMode,
    /// Vault API address, used by [`Projector::project`]
    pub address: String,
}

/// Runs projections: loader, token and Vault client wired together.
#[derive(Debug, Clone)]
pub struct Projector<T> {
    loader: ContextLoader,
    tokens: T,
    vault: VaultConfig,
}

impl<T: TokenProvider> Projector<T> {
    /// Create a projector.
    #[must_use]
    pub fn new(loader: ContextLoader, tokens: T) -> Self {
        Self {
            loader,
            tokens,
            vault: VaultConfig::default(),
        }
    }

    /// Resolve the requested context and project it.
    ///
    /// The context is resolved before the token is read, and the token is
    /// read before Vault is contacted.
    ///
    /// # Errors
    ///
    /// Returns any fatal [`VaultctlError`].
    pub async fn project(&self, request: &ProjectionRequest) -> Result<Projection> {
        let context = self.load_context(request.context_file.as_deref(), &request.context)?;
        self.project_loaded(&context, &request.address).await
    }

    /// Load a context without reading the token or contacting Vault.
    ///
    /// # Errors
    ///
    /// Returns [`VaultctlError::Context`] when the file or context is missing.
    pub fn load_context(&self, context_file: Option<&Path>, name: &str) -> Result<Context> {
        Ok(self.loader.load_context(context_file, name)?)
    }

    /// Project an already loaded context from the Vault at `address`.
    ///
    /// # Errors
    ///
    /// Returns a token error before any request, or the first fatal fetch
    /// error.
    pub async fn project_loaded(&self, context: &Context, address: &str) -> Result<Projection> {
        let token = self.tokens.token()?;

        // VAULT_SKIP_VERIFY and timeouts come from the default config
        let config = VaultConfig {
            addr: address.to_string(),
            ..self.vault.clone()
        };
        let client = VaultClient::new(config)?.with_token(token);

        info!(
            context = %context.name,
            secrets = context.secrets.len(),
            addr = client.address(),
            "Projecting context"
        );
        project_context(context, &client).await
    }

    /// Project and render lines in the request's output mode.
    ///
    /// # Errors
    ///
    /// Returns any fatal [`VaultctlError`].
    pub async fn project_lines(&self, request: &ProjectionRequest) -> Result<Vec<String>> {
        Ok(self.project(request).await?.lines(request.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Secret;
    use vaultctl_vault::{SecretValue, VaultError, VaultResult};

    struct FixedStore(SecretValueMap);

    #[async_trait::async_trait]
    impl SecretStore for FixedStore {
        async fn fetch_secret(&self, _path: &str) -> VaultResult<SecretValueMap> {
            Ok(self.0.clone())
        }
    }

    struct DeniedStore;

    #[async_trait::async_trait]
    impl SecretStore for DeniedStore {
        async fn fetch_secret(&self, path: &str) -> VaultResult<SecretValueMap> {
            Err(VaultError::permission_denied(path))
        }
    }

    fn context(keys: Vec<Key>) -> Context {
        Context {
            name: "test".into(),
            secrets: vec![Secret {
                name: "s".into(),
                path: "secret/data/s".into(),
                keys,
            }],
        }
    }

    fn store(fields: &[(&str, SecretValue)]) -> FixedStore {
        FixedStore(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_raw_value_with_export_name() {
        let ctx = context(vec![Key::new("foo").with_export_name("FOO")]);
        let projection = project_context(&ctx, &store(&[("foo", "bar".into())]))
            .await
            .unwrap();

        assert_eq!(projection.lines(OutputMode::Plain), ["FOO=bar"]);
        assert_eq!(projection.lines(OutputMode::Export), ["export FOO='bar'"]);
        assert!(projection.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_non_string_field_is_missing_key() {
        let ctx = context(vec![Key::new("port"), Key::new("host")]);
        let fields = [
            ("port", SecretValue::from(serde_json::json!(5432))),
            ("host", "db".into()),
        ];
        let projection = project_context(&ctx, &store(&fields)).await.unwrap();

        assert_eq!(projection.lines(OutputMode::Plain), ["host=db"]);
        assert_eq!(
            projection.warnings,
            [ProjectionWarning::MissingKey {
                key: "port".into(),
                path: "secret/data/s".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_raw_value() {
        let ctx = context(vec![Key::new("blob").decoded(), Key::new("next")]);
        let fields = [("blob", "not*base64".into()), ("next", "ok".into())];
        let projection = project_context(&ctx, &store(&fields)).await.unwrap();

        assert_eq!(
            projection.lines(OutputMode::Plain),
            ["blob=not*base64", "next=ok"]
        );
        assert!(matches!(
            &projection.warnings[..],
            [ProjectionWarning::DecodeFailed { key, .. }] if key == "blob"
        ));
    }

    #[tokio::test]
    async fn test_denied_secret_is_skipped() {
        let ctx = context(vec![Key::new("a")]);
        let projection = project_context(&ctx, &DeniedStore).await.unwrap();

        assert!(projection.pairs.is_empty());
        assert_eq!(
            projection.warnings[0].to_string(),
            "Not authorized to read secret: secret/data/s"
        );
    }

    #[test]
    fn test_warning_messages() {
        let missing = ProjectionWarning::MissingKey {
            key: "k".into(),
            path: "p".into(),
        };
        assert_eq!(missing.to_string(), "Key k not found in secret p");

        let decode = ProjectionWarning::DecodeFailed {
            key: "k".into(),
            reason: "Invalid padding".into(),
        };
        assert_eq!(decode.to_string(), "Failed to base64 decode k: Invalid padding");
    }
}
