//! Context definitions and the loader that reads them.
//!
//! A contexts file groups secrets under a name so one command can project
//! everything a workflow needs:
//!
//! ```hcl
//! context "dev" {
//!   secret "database" {
//!     path = "secret/data/dev/db"
//!     key "password" { export_name = "DB_PASSWORD" }
//!     key "ca_cert"  { base64_decode = true }
//!   }
//! }
//! ```

use crate::schema::{self, SchemaError};
use hcl::Body;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the contexts file looked up when no path is given.
pub const DEFAULT_CONTEXTS_FILE: &str = "contexts.hcl";

/// Errors raised while loading or resolving contexts.
#[derive(Error, Debug)]
pub enum ContextError {
    /// No file at the resolved path
    #[error("contexts file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but could not be read
    #[error("error reading contexts file {}: {source}", .path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid contexts definition
    #[error("error decoding contexts file {}: {source}", .path.display())]
    Parse {
        /// File that failed
        path: PathBuf,
        /// What was wrong
        #[source]
        source: SchemaError,
    },

    /// No context with the requested name
    #[error("context '{0}' not found in contexts file")]
    ContextNotFound(String),
}

/// All contexts declared in one file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSet {
    /// Declared contexts
    pub contexts: Vec<Context>,
}

/// A named, ordered list of secrets to resolve together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Context name
    pub name: String,
    /// Secrets in declaration order
    pub secrets: Vec<Secret>,
}

/// One secret path and the fields to extract from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    /// Label only, never used for lookups
    pub name: String,
    /// Location in the secret store
    pub path: String,
    /// Keys in declaration order
    pub keys: Vec<Key>,
}

/// One field of a secret, with optional renaming and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Field name inside the secret
    pub name: String,
    /// Name to emit instead of `name`
    pub export_name: Option<String>,
    /// Base64-decode the value before emitting
    pub base64_decode: bool,
}

impl Key {
    /// Create a key emitted under its own name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export_name: None,
            base64_decode: false,
        }
    }

    /// Emit under a different name.
    #[must_use]
    pub fn with_export_name(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = Some(export_name.into());
        self
    }

    /// Base64-decode the value.
    #[must_use]
    pub const fn decoded(mut self) -> Self {
        self.base64_decode = true;
        self
    }

    /// Name the value is emitted under. An empty export name falls back to
    /// the key name.
    #[must_use]
    pub fn effective_export_name(&self) -> &str {
        match self.export_name.as_deref() {
            Some(export) if !export.is_empty() => export,
            _ => &self.name,
        }
    }
}

impl ContextSet {
    /// Parse a contexts document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for invalid HCL or an invalid structure.
    pub fn from_hcl(src: &str) -> Result<Self, SchemaError> {
        let body = schema::parse(src)?;
        schema::check_attributes(&body, "contexts file", &[])?;
        schema::check_blocks(&body, "contexts file", &["context"])?;

        let contexts = body
            .blocks()
            .map(|block| {
                let name = schema::single_label(block)?;
                parse_context(name, block.body())
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { contexts })
    }

    /// Find a context by exact name. The first declaration wins when a
    /// name is repeated.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ContextNotFound`] when no context matches.
    pub fn resolve(&self, name: &str) -> Result<&Context, ContextError> {
        self.contexts
            .iter()
            .find(|context| context.name == name)
            .ok_or_else(|| ContextError::ContextNotFound(name.to_string()))
    }

    /// Declared context names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(|c| c.name.as_str())
    }
}

fn parse_context(name: &str, body: &Body) -> Result<Context, SchemaError> {
    let scope = format!("context \"{name}\"");
    schema::check_attributes(body, &scope, &[])?;
    schema::check_blocks(body, &scope, &["secret"])?;

    let secrets = body
        .blocks()
        .map(|block| {
            let secret_name = schema::single_label(block)?;
            parse_secret(secret_name, block.body())
        })
        .collect::<Result<_, _>>()?;

    Ok(Context {
        name: name.to_string(),
        secrets,
    })
}

fn parse_secret(name: &str, body: &Body) -> Result<Secret, SchemaError> {
    let scope = format!("secret \"{name}\"");
    schema::check_attributes(body, &scope, &["path"])?;
    schema::check_blocks(body, &scope, &["key"])?;

    let path = schema::required_string(body, "path", &scope)?;
    let keys = body
        .blocks()
        .map(|block| {
            let key_name = schema::single_label(block)?;
            parse_key(key_name, block.body())
        })
        .collect::<Result<_, _>>()?;

    Ok(Secret {
        name: name.to_string(),
        path,
        keys,
    })
}

fn parse_key(name: &str, body: &Body) -> Result<Key, SchemaError> {
    let scope = format!("key \"{name}\"");
    schema::check_attributes(body, &scope, &["export_name", "base64_decode"])?;
    schema::check_blocks(body, &scope, &[])?;

    Ok(Key {
        name: name.to_string(),
        export_name: schema::optional_string(body, "export_name")?,
        base64_decode: schema::optional_bool(body, "base64_decode")?.unwrap_or(false),
    })
}

/// Reads contexts files relative to a base directory.
#[derive(Debug, Clone)]
pub struct ContextLoader {
    base_dir: PathBuf,
}

impl ContextLoader {
    /// Create a loader that resolves the default file against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create a loader rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Read`] when the working directory is unavailable.
    pub fn from_current_dir() -> Result<Self, ContextError> {
        std::env::current_dir()
            .map(Self::new)
            .map_err(|source| ContextError::Read {
                path: PathBuf::from("."),
                source,
            })
    }

    /// Path that [`load`](Self::load) reads for the given override.
    #[must_use]
    pub fn resolve_path(&self, path: Option<&Path>) -> PathBuf {
        path.map_or_else(
            || self.base_dir.join(DEFAULT_CONTEXTS_FILE),
            Path::to_path_buf,
        )
    }

    /// Read and parse a contexts file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound`, `Read` or `Parse` as appropriate.
    pub fn load(&self, path: Option<&Path>) -> Result<ContextSet, ContextError> {
        let path = self.resolve_path(path);
        debug!(path = %path.display(), "Loading contexts file");

        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ContextError::FileNotFound(path.clone())
            } else {
                ContextError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        ContextSet::from_hcl(&content).map_err(|source| ContextError::Parse { path, source })
    }

    /// Load a contexts file and return the named context.
    ///
    /// # Errors
    ///
    /// Propagates [`load`](Self::load) errors and returns `ContextNotFound`
    /// for an unknown name.
    pub fn load_context(&self, path: Option<&Path>, name: &str) -> Result<Context, ContextError> {
        let set = self.load(path)?;
        set.resolve(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXTS: &str = r#"
context "dev" {
  secret "database" {
    path = "secret/data/dev/db"
    key "username" {}
    key "password" {
      export_name = "DB_PASSWORD"
    }
  }

  secret "tls" {
    path = "secret/data/dev/tls"
    key "ca_cert" {
      base64_decode = true
    }
  }
}

context "prod" {
  secret "database" {
    path = "secret/data/prod/db"
    key "password" {}
  }
}
"#;

    #[test]
    fn test_parses_contexts_in_order() {
        let set = ContextSet::from_hcl(CONTEXTS).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), ["dev", "prod"]);

        let dev = set.resolve("dev").unwrap();
        assert_eq!(dev.secrets.len(), 2);
        assert_eq!(dev.secrets[0].name, "database");
        assert_eq!(dev.secrets[0].path, "secret/data/dev/db");
        assert_eq!(
            dev.secrets[0].keys,
            [Key::new("username"), Key::new("password").with_export_name("DB_PASSWORD")]
        );
        assert_eq!(dev.secrets[1].keys, [Key::new("ca_cert").decoded()]);
    }

    #[test]
    fn test_resolve_is_exact_and_case_sensitive() {
        let set = ContextSet::from_hcl(CONTEXTS).unwrap();
        assert!(matches!(set.resolve("Dev"), Err(ContextError::ContextNotFound(n)) if n == "Dev"));
        assert!(matches!(set.resolve("de"), Err(ContextError::ContextNotFound(_))));
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let set = ContextSet::from_hcl(
            r#"
context "dup" {
  secret "a" {
    path = "secret/first"
  }
}
context "dup" {
  secret "b" {
    path = "secret/second"
  }
}
"#,
        )
        .unwrap();
        assert_eq!(set.resolve("dup").unwrap().secrets[0].path, "secret/first");
    }

    #[test]
    fn test_effective_export_name() {
        assert_eq!(Key::new("user").effective_export_name(), "user");
        assert_eq!(
            Key::new("user").with_export_name("DB_USER").effective_export_name(),
            "DB_USER"
        );
        assert_eq!(Key::new("user").with_export_name("").effective_export_name(), "user");
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let err = ContextSet::from_hcl("context \"x\" {\n  secret \"s\" {}\n}\n").unwrap_err();
        assert!(matches!(err, SchemaError::MissingAttribute { ref name, .. } if name == "path"));
    }

    #[test]
    fn test_unknown_key_attribute_is_rejected() {
        let err = ContextSet::from_hcl(
            "context \"x\" {\n  secret \"s\" {\n    path = \"p\"\n    key \"k\" {\n      rename = \"K\"\n    }\n  }\n}\n",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownAttribute { ref name, .. } if name == "rename"));
    }

    #[test]
    fn test_non_bool_decode_flag_is_rejected() {
        let err = ContextSet::from_hcl(
            "context \"x\" {\n  secret \"s\" {\n    path = \"p\"\n    key \"k\" {\n      base64_decode = \"yes\"\n    }\n  }\n}\n",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::AttributeType { .. }));
    }

    #[test]
    fn test_empty_file_has_no_contexts() {
        let set = ContextSet::from_hcl("").unwrap();
        assert!(set.contexts.is_empty());
        assert!(matches!(set.resolve("dev"), Err(ContextError::ContextNotFound(_))));
    }

    #[test]
    fn test_loader_default_path() {
        let loader = ContextLoader::new("/work");
        assert_eq!(loader.resolve_path(None), PathBuf::from("/work/contexts.hcl"));
        assert_eq!(
            loader.resolve_path(Some(Path::new("/etc/ctx.hcl"))),
            PathBuf::from("/etc/ctx.hcl")
        );
    }

    #[test]
    fn test_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ContextLoader::new(dir.path());
        let err = loader.load(None).unwrap_err();
        assert!(matches!(err, ContextError::FileNotFound(p) if p == dir.path().join("contexts.hcl")));
    }

    #[test]
    fn test_loader_reads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONTEXTS_FILE), CONTEXTS).unwrap();

        let context = ContextLoader::new(dir.path()).load_context(None, "prod").unwrap();
        assert_eq!(context.name, "prod");
        assert_eq!(context.secrets[0].path, "secret/data/prod/db");
    }

    #[test]
    fn test_loader_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.hcl");
        std::fs::write(&file, "context \"x\" {").unwrap();

        let err = ContextLoader::new(dir.path()).load(Some(file.as_path())).unwrap_err();
        assert!(matches!(err, ContextError::Parse { ref path, .. } if *path == file));
        assert!(err.to_string().starts_with("error decoding contexts file"));
    }

    #[test]
    fn test_loader_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContextLoader::new(dir.path())
            .load(Some(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ContextError::Read { .. }));
    }
}
