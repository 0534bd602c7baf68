//! Boundary I/O: the primitive fragment in, grammar and docs out.
use std::path::Path;

use crate::error::{Error, Result};

pub fn read_primitives(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::io("read primitive grammar", path, source))
}

/// Write `text` to `path`, creating missing parent directories.
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::io("create directory", parent, source))?;
    }
    std::fs::write(path, text).map_err(|source| Error::io("write", path, source))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_new_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/grammar.gbnf");
        write_document(&path, "root ::= f").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "root ::= f");
    }

    #[test]
    fn missing_fragment_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.gbnf");
        let err = read_primitives(&path).unwrap_err();
        assert!(matches!(err, Error::Io { op: "read primitive grammar", .. }));
        let message = err.to_string();
        assert!(message.contains("missing.gbnf"), "{message}");
        assert!(message.starts_with("failed to read primitive grammar"), "{message}");
    }

    #[test]
    fn write_failure_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let err = write_document(dir.path(), "x").unwrap_err();
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}
