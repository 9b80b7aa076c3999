//! Access to the persisted Vault token.

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::config_dir;

/// File name of the token inside the vaultctl config directory.
pub const TOKEN_FILE: &str = "token";

/// Errors raised while reading the token.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The home directory could not be determined
    #[error("no valid token found, unable to determine home directory")]
    NoHomeDir,

    /// No token file
    #[error("no valid token found at {}, please authenticate first", .0.display())]
    NotFound(PathBuf),

    /// Token file exists but is unreadable
    #[error("no valid token found, error reading {}: {source}", .path.display())]
    Read {
        /// Token file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Token file is blank
    #[error("no valid token found, {} is empty, please authenticate first", .0.display())]
    Empty(PathBuf),
}

/// Source of the credential attached to Vault requests.
pub trait TokenProvider {
    /// Return the token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] when no usable token exists.
    fn token(&self) -> Result<SecretString, TokenError>;
}

/// Reads the token from a file, trimming surrounding whitespace.
///
/// Without a known home directory there is no default file, and reading
/// the token fails with [`TokenError::NoHomeDir`].
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: Option<PathBuf>,
}

impl FileTokenProvider {
    /// Read the token from an explicit file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Read the token from `~/.vaultctl/token`.
    #[must_use]
    pub fn from_default_location() -> Self {
        Self {
            path: config_dir().map(|dir| dir.join(TOKEN_FILE)),
        }
    }

    /// Token file location, if one is known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TokenProvider for FileTokenProvider {
    fn token(&self) -> Result<SecretString, TokenError> {
        let path = self.path.as_deref().ok_or(TokenError::NoHomeDir)?;
        debug!(path = %path.display(), "Reading token");

        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TokenError::NotFound(path.to_path_buf())
            } else {
                TokenError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let raw = SecretString::from(raw);
        let trimmed = raw.expose_secret().trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty(path.to_path_buf()));
        }

        Ok(SecretString::from(trimmed))
    }
}

impl TokenProvider for SecretString {
    fn token(&self) -> Result<SecretString, TokenError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_trims_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        std::fs::write(&path, "  hvs.abc123\n\n").unwrap();

        let token = FileTokenProvider::new(&path).token().unwrap();
        assert_eq!(token.expose_secret(), "hvs.abc123");
    }

    #[test]
    fn test_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileTokenProvider::new(dir.path().join(TOKEN_FILE))
            .token()
            .unwrap_err();
        assert!(matches!(err, TokenError::NotFound(_)));
        assert!(err.to_string().contains("please authenticate first"));
    }

    #[test]
    fn test_blank_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        std::fs::write(&path, " \n\t\n").unwrap();

        let err = FileTokenProvider::new(&path).token().unwrap_err();
        assert!(matches!(err, TokenError::Empty(_)));
    }

    #[test]
    fn test_unreadable_token_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileTokenProvider::new(dir.path()).token().unwrap_err();
        assert!(matches!(err, TokenError::Read { .. }));
    }

    #[test]
    fn test_token_is_read_fresh_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        let provider = FileTokenProvider::new(&path);

        std::fs::write(&path, "first").unwrap();
        assert_eq!(provider.token().unwrap().expose_secret(), "first");

        std::fs::write(&path, "second").unwrap();
        assert_eq!(provider.token().unwrap().expose_secret(), "second");
    }

    #[test]
    fn test_default_location_is_under_config_dir() {
        if let Some(path) = FileTokenProvider::from_default_location().path() {
            assert!(path.ends_with(".vaultctl/token"));
        }
    }

    #[test]
    fn test_no_home_dir_fails_on_read() {
        let provider = FileTokenProvider { path: None };
        let err = provider.token().unwrap_err();
        assert!(matches!(err, TokenError::NoHomeDir));
        assert!(err.to_string().starts_with("no valid token found"));
    }
}
