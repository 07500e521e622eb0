//! File capability

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::storage::item::StorageItem;

/// Leaf item holding bytes
#[async_trait]
pub trait StorageFile: StorageItem {
    async fn read_bytes(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the whole content of the file.
    async fn write_bytes(&self, content: &[u8]) -> StorageResult<()>;

    async fn read_text(&self) -> StorageResult<String> {
        let bytes = self.read_bytes().await?;
        String::from_utf8(bytes).map_err(|e| {
            StorageError::InvalidData(format!("{} is not valid UTF-8: {}", self.path(), e))
        })
    }

    async fn write_text(&self, content: &str) -> StorageResult<()> {
        self.write_bytes(content.as_bytes()).await
    }
}
