//! vaultctl: project Vault secret contexts into shell environments.
//!
//! A contexts file names groups of Vault secrets and the keys to extract
//! from each. `vaultctl get <context>` reads them with the persisted token
//! and prints `name=value` lines or `export` statements.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod projection;
pub mod schema;
pub mod status;
pub mod token;
pub mod transform;

pub use config::CliConfig;
pub use context::{Context, ContextLoader, ContextSet, Key, Secret};
pub use error::{Result, VaultctlError};
pub use output::{ExportPair, OutputMode};
pub use projection::{Projection, ProjectionRequest, ProjectionWarning, Projector, project_context};
pub use token::{FileTokenProvider, TokenProvider};
