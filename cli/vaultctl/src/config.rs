//! Static cluster configuration.
//!
//! Loaded once at startup from `~/.vaultctl/config.hcl` (or `--config`) and
//! passed by reference to the command handlers.

use crate::schema::{self, SchemaError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory holding vaultctl state, relative to the home directory.
pub const CONFIG_DIR: &str = ".vaultctl";

/// Name of the cluster configuration file.
pub const CONFIG_FILE: &str = "config.hcl";

/// Errors raised by cluster configuration lookups.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit configuration file is missing
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Configuration file could not be read
    #[error("error reading config file {}: {source}", .path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is malformed
    #[error("unable to decode config file {}: {source}", .path.display())]
    Parse {
        /// File that failed
        path: PathBuf,
        /// What was wrong
        #[source]
        source: SchemaError,
    },

    /// No cluster with this name
    #[error("config for Vault cluster '{0}' not found")]
    UnknownCluster(String),

    /// Cluster has neither an address nor servers
    #[error("no address or servers found for cluster '{0}'")]
    NoAddress(String),
}

/// `~/.vaultctl`, if the home directory is known.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR))
}

/// One Vault cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Preferred API address (load balancer)
    pub address: Option<String>,
    /// Individual server addresses
    pub servers: Vec<String>,
}

impl ClusterConfig {
    /// Address to send API requests to: `address`, else the first server.
    #[must_use]
    pub fn api_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .or_else(|| self.servers.first().map(String::as_str))
    }
}

/// vaultctl configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Clusters keyed by name
    pub clusters: BTreeMap<String, ClusterConfig>,
}

impl CliConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for invalid HCL or an invalid structure.
    pub fn from_hcl(src: &str) -> Result<Self, SchemaError> {
        let body = schema::parse(src)?;
        schema::check_attributes(&body, "config file", &[])?;
        schema::check_blocks(&body, "config file", &["cluster"])?;

        let mut clusters = BTreeMap::new();
        for block in body.blocks() {
            let name = schema::single_label(block)?;
            let scope = format!("cluster \"{name}\"");
            let body = block.body();
            schema::check_attributes(body, &scope, &["address", "servers"])?;
            schema::check_blocks(body, &scope, &[])?;

            let cluster = ClusterConfig {
                address: schema::optional_string(body, "address")?,
                servers: schema::optional_string_list(body, "servers")?.unwrap_or_default(),
            };
            clusters.entry(name.to_string()).or_insert(cluster);
        }

        Ok(Self { clusters })
    }

    /// Load the configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `~/.vaultctl/config.hcl` is read if present and an empty
    /// configuration is returned otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
                    debug!("No home directory, using empty configuration");
                    return Ok(Self::default());
                };
                if path.exists() {
                    Self::load_from_path(&path)
                } else {
                    debug!(path = %path.display(), "No config file, using empty configuration");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file is missing, unreadable or
    /// malformed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_hcl(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up a cluster by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCluster`] for an unknown name.
    pub fn cluster(&self, name: &str) -> Result<&ClusterConfig, ConfigError> {
        self.clusters
            .get(name)
            .ok_or_else(|| ConfigError::UnknownCluster(name.to_string()))
    }

    /// Vault API address of a cluster.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCluster` or `NoAddress`.
    pub fn vault_address(&self, name: &str) -> Result<&str, ConfigError> {
        self.cluster(name)?
            .api_address()
            .ok_or_else(|| ConfigError::NoAddress(name.to_string()))
    }
}
