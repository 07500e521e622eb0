//! In-memory file handle

use std::fmt;

use async_trait::async_trait;
use log::debug;

use crate::config::BackendLimits;
use crate::error::StorageResult;
use crate::memory::tree::SharedTree;
use crate::storage::{
    CreationCollisionOption, ItemKind, ItemPath, ItemProperties, StorageFile, StorageItem,
};

#[derive(Clone)]
pub struct MemoryFile {
    tree: SharedTree,
    path: ItemPath,
    name: String,
    limits: BackendLimits,
}

impl MemoryFile {
    pub(crate) fn new(tree: SharedTree, path: ItemPath, limits: BackendLimits) -> Self {
        let name = path.name().unwrap_or_default().to_string();
        Self {
            tree,
            path,
            name,
            limits,
        }
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl StorageItem for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &ItemPath {
        &self.path
    }

    fn kind(&self) -> ItemKind {
        ItemKind::File
    }

    async fn properties(&self) -> StorageResult<ItemProperties> {
        let tree = self.tree.read().await;
        Ok(tree.node(&self.path, ItemKind::File)?.properties())
    }

    async fn delete(&self) -> StorageResult<()> {
        self.tree.write().await.delete(&self.path, ItemKind::File)?;
        debug!("Deleted in-memory file {}", self.path);
        Ok(())
    }

    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self> {
        let new_path = self.tree.write().await.rename(
            &self.path,
            ItemKind::File,
            desired_name,
            option,
            self.limits.max_name_length,
        )?;
        debug!("Renamed in-memory file {} -> {}", self.path, new_path);
        Ok(MemoryFile::new(self.tree.clone(), new_path, self.limits))
    }
}

#[async_trait]
impl StorageFile for MemoryFile {
    async fn read_bytes(&self) -> StorageResult<Vec<u8>> {
        self.tree.read().await.read(&self.path)
    }

    async fn write_bytes(&self, content: &[u8]) -> StorageResult<()> {
        self.tree.write().await.write(&self.path, content)?;
        debug!("Wrote {} bytes to in-memory file {}", content.len(), self.path);
        Ok(())
    }
}
