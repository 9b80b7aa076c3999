//! Rendering projected pairs for shells and files.

use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// How pairs are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// `name=value`
    #[default]
    Plain,
    /// `export name='value'`
    Export,
}

impl OutputMode {
    /// Mode selected by the `--export` flag.
    #[must_use]
    pub const fn from_export_flag(export: bool) -> Self {
        if export { Self::Export } else { Self::Plain }
    }
}

/// One resolved value and the name it is emitted under.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportPair {
    /// Effective export name
    pub name: String,
    /// Final value after transformations
    pub value: String,
}

impl std::fmt::Debug for ExportPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPair")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl ExportPair {
    /// Create a pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Render for stdout.
    #[must_use]
    pub fn render(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Plain => format!("{}={}", self.name, self.value),
            OutputMode::Export => format!("export {}='{}'", self.name, self.value),
        }
    }

    /// Render as an export line that a POSIX shell reads back verbatim.
    #[must_use]
    pub fn render_shell_safe(&self) -> String {
        format!("export {}='{}'", self.name, escape_single_quotes(&self.value))
    }
}

/// Escape a value for use inside single quotes: `'` becomes `'\''`.
#[must_use]
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Write all pairs as shell-safe export lines to `path`.
///
/// Lines go to a temporary file next to `path`, which replaces `path` only
/// after every line is written and synced. On error the destination is left
/// untouched and the temporary file is removed.
///
/// # Errors
///
/// Returns any I/O error from creating, writing or renaming the file.
pub fn write_export_file(path: &Path, pairs: &[ExportPair]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut file);
        for pair in pairs {
            writeln!(writer, "{}", pair.render_shell_safe())?;
        }
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), count = pairs.len(), "Wrote export file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_export_rendering() {
        let pair = ExportPair::new("FOO", "bar");
        assert_eq!(pair.render(OutputMode::Plain), "FOO=bar");
        assert_eq!(pair.render(OutputMode::Export), "export FOO='bar'");
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(OutputMode::from_export_flag(true), OutputMode::Export);
        assert_eq!(OutputMode::from_export_flag(false), OutputMode::Plain);
    }

    #[test]
    fn test_escape_single_quotes() {
        assert_eq!(escape_single_quotes("it's"), r"it'\''s");
        assert_eq!(escape_single_quotes("plain"), "plain");
        assert_eq!(
            ExportPair::new("Q", "a'b").render_shell_safe(),
            r"export Q='a'\''b'"
        );
    }

    #[test]
    fn test_debug_redacts_value() {
        let debug = format!("{:?}", ExportPair::new("TOKEN", "hunter2"));
        assert!(debug.contains("TOKEN"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_write_export_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.env");
        std::fs::write(&path, "stale\n").unwrap();

        write_export_file(
            &path,
            &[ExportPair::new("A", "1"), ExportPair::new("B", "it's")],
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "export A='1'\nexport B='it'\\''s'\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_export_file_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("secrets.env");
        assert!(write_export_file(&path, &[ExportPair::new("A", "1")]).is_err());
        assert!(!path.exists());
    }
}
