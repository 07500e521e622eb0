//! In-memory folder handle

use std::fmt;

use async_trait::async_trait;
use log::{debug, info};

use crate::config::BackendLimits;
use crate::error::StorageResult;
use crate::memory::file::MemoryFile;
use crate::memory::tree::{MemoryTree, SharedTree};
use crate::storage::{
    CreationCollisionOption, FolderItem, Item, ItemKind, ItemPath, ItemProperties, StorageFolder,
    StorageItem, parse_relative,
};

/// Folder inside a shared in-memory tree
#[derive(Clone)]
pub struct MemoryFolder {
    tree: SharedTree,
    path: ItemPath,
    name: String,
    limits: BackendLimits,
}

impl MemoryFolder {
    /// Fresh, empty tree whose root folder is called `name`
    pub fn new_root(name: impl Into<String>) -> Self {
        Self::with_limits(name, BackendLimits::default())
    }

    pub fn with_limits(name: impl Into<String>, limits: BackendLimits) -> Self {
        let name = name.into();
        info!("Created in-memory storage root {}", name);
        Self {
            tree: MemoryTree::shared(),
            path: ItemPath::root(),
            name,
            limits,
        }
    }

    fn folder_at(&self, path: ItemPath) -> MemoryFolder {
        MemoryFolder {
            tree: self.tree.clone(),
            name: path.name().unwrap_or(&self.name).to_string(),
            path,
            limits: self.limits,
        }
    }

    fn file_at(&self, path: ItemPath) -> MemoryFile {
        MemoryFile::new(self.tree.clone(), path, self.limits)
    }

    fn item_at(&self, path: ItemPath, kind: ItemKind) -> FolderItem<Self> {
        match kind {
            ItemKind::File => Item::File(self.file_at(path)),
            ItemKind::Folder => Item::Folder(self.folder_at(path)),
        }
    }
}

impl fmt::Debug for MemoryFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFolder")
            .field("path", &self.path)
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl StorageItem for MemoryFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &ItemPath {
        &self.path
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Folder
    }

    async fn properties(&self) -> StorageResult<ItemProperties> {
        let tree = self.tree.read().await;
        Ok(tree.node(&self.path, ItemKind::Folder)?.properties())
    }

    async fn delete(&self) -> StorageResult<()> {
        self.tree
            .write()
            .await
            .delete(&self.path, ItemKind::Folder)?;
        debug!("Deleted in-memory folder {}", self.path);
        Ok(())
    }

    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self> {
        let new_path = self.tree.write().await.rename(
            &self.path,
            ItemKind::Folder,
            desired_name,
            option,
            self.limits.max_name_length,
        )?;
        debug!("Renamed in-memory folder {} -> {}", self.path, new_path);
        Ok(self.folder_at(new_path))
    }
}

#[async_trait]
impl StorageFolder for MemoryFolder {
    type File = MemoryFile;

    async fn create_file_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<MemoryFile> {
        let path = self.tree.write().await.create(
            &self.path,
            desired_name,
            ItemKind::File,
            option,
            self.limits.max_name_length,
        )?;
        debug!("Created in-memory file {} ({})", path, option);
        Ok(self.file_at(path))
    }

    async fn create_folder_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<MemoryFolder> {
        let path = self.tree.write().await.create(
            &self.path,
            desired_name,
            ItemKind::Folder,
            option,
            self.limits.max_name_length,
        )?;
        debug!("Created in-memory folder {} ({})", path, option);
        Ok(self.folder_at(path))
    }

    async fn get_item(&self, path: &str) -> StorageResult<FolderItem<Self>> {
        let segments = parse_relative(path)?;
        let (resolved, kind) = self.tree.read().await.resolve(&self.path, &segments)?;
        Ok(self.item_at(resolved, kind))
    }

    async fn get_items(&self) -> StorageResult<Vec<FolderItem<Self>>> {
        let children = {
            let tree = self.tree.read().await;
            tree.node(&self.path, ItemKind::Folder)?;
            tree.children(&self.path)
        };

        Ok(children
            .into_iter()
            .map(|(path, kind)| self.item_at(path, kind))
            .collect())
    }
}
