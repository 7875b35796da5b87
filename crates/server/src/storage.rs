//! Flat file storage for import inputs and generated reports.
//!
//! A [`FileStore`] owns one directory. Names are plain file names: anything
//! that would escape the directory or hide the file is rejected before the
//! filesystem is touched.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Maximum accepted file name length (bytes).
const MAX_FILE_NAME_LENGTH: usize = 255;

/// Errors raised by a [`FileStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The name is not a plain, safe file name.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// No file with this name exists.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A file with this name already exists and will not be overwritten.
    #[error("file already exists: {0}")]
    AlreadyExists(String),

    /// Other filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce a client-supplied name to a safe file name.
///
/// Directory components are dropped, only `[A-Za-z0-9._-]` is kept, leading
/// periods are removed and runs of periods collapse to one. Returns `None`
/// when nothing usable remains.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let file_name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut sanitized = String::with_capacity(file_name.len());
    for c in file_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        if c == '.' && (sanitized.is_empty() || sanitized.ends_with('.')) {
            continue;
        }
        sanitized.push(c);
    }

    (!sanitized.is_empty() && sanitized.len() <= MAX_FILE_NAME_LENGTH).then_some(sanitized)
}

/// A directory of named files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write `bytes` to a new file called `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if `name` is not already a safe file
    /// name, `StorageError::AlreadyExists` if the file exists, or
    /// `StorageError::Io` on any other filesystem failure.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(name)?;

        tokio::fs::create_dir_all(&self.root).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(name.to_string()),
                _ => StorageError::Io(e),
            })?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "File saved");
        Ok(path)
    }

    /// Read the file called `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if `name` is not a safe file name,
    /// `StorageError::NotFound` if it does not exist, or `StorageError::Io`
    /// on any other filesystem failure.
    pub async fn load(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        match sanitize_file_name(name) {
            Some(safe) if safe == name => Ok(self.root.join(safe)),
            _ => Err(StorageError::InvalidName(name.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("DEMO.xlsx").as_deref(), Some("DEMO.xlsx"));
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\me\\list.xlsx").as_deref(),
            Some("list.xlsx")
        );
        assert_eq!(sanitize_file_name(".hidden").as_deref(), Some("hidden"));
        assert_eq!(
            sanitize_file_name("my users (1).xlsx").as_deref(),
            Some("myusers1.xlsx")
        );
        assert_eq!(sanitize_file_name("a..b").as_deref(), Some("a.b"));
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("../"), None);
        assert_eq!(sanitize_file_name("..."), None);
        assert_eq!(sanitize_file_name(&"a".repeat(300)), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("reports"));

        let path = store.save("report.xlsx", b"bytes").await.unwrap();

        assert_eq!(path, dir.path().join("reports").join("report.xlsx"));
        assert_eq!(store.load("report.xlsx").await.unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("report.xlsx", b"first").await.unwrap();
        let err = store.save("report.xlsx", b"second").await.unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(store.load("report.xlsx").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.load("missing.xlsx").await.unwrap_err();

        assert!(matches!(err, StorageError::NotFound(ref name) if name == "missing.xlsx"));
        assert_eq!(err.to_string(), "File not found: missing.xlsx");
    }

    #[tokio::test]
    async fn test_unsafe_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("inner"));

        for name in ["../escape.xlsx", "sub/dir.xlsx", ".env", ""] {
            let err = store.load(name).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidName(_)), "{name}");
            let err = store.save(name, b"x").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidName(_)), "{name}");
        }
        assert!(!dir.path().join("escape.xlsx").exists());
    }
}
