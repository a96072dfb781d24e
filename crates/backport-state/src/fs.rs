use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::storage_traits::{StateDocument, StateResult, StateStore};

/// Filesystem-backed state store.
///
/// Layout: `<root>/<document file name>`, e.g. `target/commits.json`.
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    /// Create a new `FsStateStore` rooted at `root`. Creates `root` if needed.
    pub fn new(root: impl AsRef<Path>) -> StateResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, document: StateDocument) -> PathBuf {
        self.root.join(document.file_name())
    }
}

#[async_trait]
impl StateStore for FsStateStore {
    async fn read(&self, document: StateDocument) -> StateResult<Option<Vec<u8>>> {
        match fs::read(self.document_path(document)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, document: StateDocument, data: &[u8]) -> StateResult<()> {
        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.persist(self.document_path(document))
            .map_err(|e| e.error)?;
        Ok(())
    }

    async fn contains(&self, document: StateDocument) -> StateResult<bool> {
        Ok(self.document_path(document).exists())
    }
}
