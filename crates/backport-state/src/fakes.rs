//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryStateStore`, which satisfies the `StateStore` contract
//! without touching the filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage_traits::*;

/// In-memory document store backed by a `HashMap<document, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    documents: Mutex<HashMap<StateDocument, Vec<u8>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents written so far.
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self, document: StateDocument) -> StateResult<Option<Vec<u8>>> {
        let documents = self.documents.lock().unwrap();
        Ok(documents.get(&document).cloned())
    }

    async fn write(&self, document: StateDocument, data: &[u8]) -> StateResult<()> {
        let mut documents = self.documents.lock().unwrap();
        documents.insert(document, data.to_vec());
        Ok(())
    }

    async fn contains(&self, document: StateDocument) -> StateResult<bool> {
        let documents = self.documents.lock().unwrap();
        Ok(documents.contains_key(&document))
    }
}
