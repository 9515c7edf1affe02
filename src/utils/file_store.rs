//! Disk-backed upload store

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::traits::FileStore;
use crate::types::{ImportError, ImportResult};

/// File store rooted at an upload directory on the local filesystem
///
/// File names are taken as-is relative to the root; path separators are
/// rejected so a caller-supplied name cannot escape the directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> ImportResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(ImportError::Storage(format!("invalid file name: {name}")));
        }
        Ok(self.root.join(name))
    }

    /// The upload directory this store reads from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, name: &str) -> ImportResult<Vec<u8>> {
        let path = self.resolve(name)?;
        std::fs::read(&path)
            .map_err(|e| ImportError::FatalInput(format!("cannot read {}: {e}", path.display())))
    }

    async fn delete(&mut self, name: &str) -> ImportResult<()> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path)
            .map_err(|e| ImportError::Storage(format!("cannot delete {}: {e}", path.display())))
    }
}
