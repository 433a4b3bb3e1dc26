//! Directory-scoped file access
//!
//! Names handed to the store come straight from the request target, so they
//! are checked before they are joined onto the base directory. Writes land in
//! a temporary sibling first and are renamed into place, which keeps
//! concurrent readers from seeing a half-written file.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Prefix of in-flight upload files. Names carrying it are never resolved.
pub const TEMP_PREFIX: &str = ".tern-upload.";

#[derive(Debug)]
pub enum StorageError {
    /// The named file does not exist
    NotFound,
    /// The name is empty or would escape the base directory
    InvalidPath(String),
    /// Any other I/O failure
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "file not found"),
            StorageError::InvalidPath(name) => write!(f, "invalid file name: {:?}", name),
            StorageError::Io(e) => write!(f, "storage I/O failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::Io(e),
        }
    }
}

/// Reads and writes files inside one base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Reads the whole file called `name`.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        let data = tokio::fs::read(&path).await?;
        Ok(data)
    }

    /// Replaces the file called `name` with `data`.
    pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let temp = temp_sibling(&path);

        if let Err(e) = tokio::fs::write(&temp, data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::Io(e));
        }

        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    /// Joins `name` onto the base directory, rejecting anything that is not
    /// a plain relative path or that names an in-flight upload.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name);
        let mut last = None;

        for component in relative.components() {
            match component {
                Component::Normal(part) => last = Some(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::InvalidPath(name.to_string()));
                }
            }
        }

        let Some(file) = last else {
            return Err(StorageError::InvalidPath(name.to_string()));
        };
        if name.ends_with('/') || file.to_string_lossy().starts_with(TEMP_PREFIX) {
            return Err(StorageError::InvalidPath(name.to_string()));
        }

        Ok(self.base.join(relative))
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(
        "{}{}.{}.{}",
        TEMP_PREFIX,
        file_name,
        std::process::id(),
        n
    ))
}
