//! Folder capability
//!
//! Creation, lookup and enumeration of the children of a directory-like
//! container. Backends implement the four required methods; every other
//! operation derives from them so that files, folders and items always agree.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::storage::collision::CreationCollisionOption;
use crate::storage::file::StorageFile;
use crate::storage::item::{Item, ItemKind, StorageItem};

/// Item enumerated or resolved from a folder of type `D`
pub type FolderItem<D> = Item<<D as StorageFolder>::File, D>;

#[async_trait]
pub trait StorageFolder: StorageItem {
    type File: StorageFile;

    /// Creates a new file in this folder.
    async fn create_file_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self::File>;

    /// Creates a new folder nested within this one.
    async fn create_folder_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self>;

    /// Resolves `path` relative to this folder.
    ///
    /// A bare name addresses a direct child. Every intermediate segment must
    /// be a folder, otherwise the lookup is `NotFound`.
    async fn get_item(&self, path: &str) -> StorageResult<FolderItem<Self>>;

    /// Every direct child, sorted by name.
    async fn get_items(&self) -> StorageResult<Vec<FolderItem<Self>>>;

    async fn create_file(&self, desired_name: &str) -> StorageResult<Self::File> {
        self.create_file_with(desired_name, CreationCollisionOption::default())
            .await
    }

    async fn create_folder(&self, desired_name: &str) -> StorageResult<Self> {
        self.create_folder_with(desired_name, CreationCollisionOption::default())
            .await
    }

    async fn get_file(&self, path: &str) -> StorageResult<Self::File> {
        match self.get_item(path).await? {
            Item::File(file) => Ok(file),
            Item::Folder(folder) => Err(StorageError::TypeMismatch {
                path: folder.path().to_string(),
                expected: ItemKind::File,
            }),
        }
    }

    async fn get_folder(&self, path: &str) -> StorageResult<Self> {
        match self.get_item(path).await? {
            Item::Folder(folder) => Ok(folder),
            Item::File(file) => Err(StorageError::TypeMismatch {
                path: file.path().to_string(),
                expected: ItemKind::Folder,
            }),
        }
    }

    async fn get_files(&self) -> StorageResult<Vec<Self::File>> {
        let items = self.get_items().await?;
        Ok(items.into_iter().filter_map(Item::into_file).collect())
    }

    async fn get_folders(&self) -> StorageResult<Vec<Self>> {
        let items = self.get_items().await?;
        Ok(items.into_iter().filter_map(Item::into_folder).collect())
    }

    /// Like `get_item`, but absence is `Ok(None)` instead of `NotFound`.
    async fn try_get_item(&self, name: &str) -> StorageResult<Option<FolderItem<Self>>> {
        match self.get_item(name).await {
            Ok(item) => Ok(Some(item)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
