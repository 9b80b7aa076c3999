//! Top-level error type for vaultctl commands.
//!
//! Every variant here is fatal: the command stops and reports it. Conditions
//! that only skip a secret or a key are
//! [`ProjectionWarning`](crate::projection::ProjectionWarning)s instead.

use crate::{config::ConfigError, context::ContextError, token::TokenError};
use std::path::PathBuf;
use thiserror::Error;
use vaultctl_vault::VaultError;

/// Fatal vaultctl errors.
#[derive(Error, Debug)]
pub enum VaultctlError {
    /// Contexts file missing, unreadable, malformed, or context unknown
    #[error(transparent)]
    Context(#[from] ContextError),

    /// No usable token
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Cluster configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Vault client construction or a non-secret request failed
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// A secret read failed for a reason other than authorization
    #[error("failed to fetch secret {path}: {source}")]
    Fetch {
        /// Secret path
        path: String,
        /// Underlying Vault error
        #[source]
        source: VaultError,
    },

    /// Export file could not be written
    #[error("failed to write export file {}: {source}", .path.display())]
    Export {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Neither a cluster nor an address was given
    #[error("no Vault address: pass --cluster or --address, or set VAULT_ADDR")]
    NoAddress,

    /// Cluster has no servers to show
    #[error("no Vault servers in configuration")]
    NoServers,
}

/// Result type for vaultctl operations.
pub type Result<T> = std::result::Result<T, VaultctlError>;
