//! Item capability shared by files and folders

use std::fmt;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::storage::collision::CreationCollisionOption;
use crate::storage::results::ItemProperties;
use crate::storage::validation::ItemPath;

/// Kind of a storage item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    File,
    Folder,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::File => write!(f, "file"),
            ItemKind::Folder => write!(f, "folder"),
        }
    }
}

/// Base capability of every handle.
///
/// Handles are cheap to clone and never lock the underlying item; two handles
/// to the same item may coexist.
#[async_trait]
pub trait StorageItem: Clone + fmt::Debug + Send + Sync {
    /// Name of the item within its parent
    fn name(&self) -> &str;

    /// Location relative to the backend root
    fn path(&self) -> &ItemPath;

    fn kind(&self) -> ItemKind;

    async fn properties(&self) -> StorageResult<ItemProperties>;

    /// Removes the item, recursively for folders.
    async fn delete(&self) -> StorageResult<()>;

    /// Renames the item inside its current parent.
    ///
    /// `OpenIfExists` is treated as `FailIfExists`.
    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self>;
}

/// Either a file or a folder handle
#[derive(Debug, Clone)]
pub enum Item<F, D> {
    File(F),
    Folder(D),
}

impl<F, D> Item<F, D> {
    pub fn is_file(&self) -> bool {
        matches!(self, Item::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }

    pub fn as_file(&self) -> Option<&F> {
        match self {
            Item::File(f) => Some(f),
            Item::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&D> {
        match self {
            Item::File(_) => None,
            Item::Folder(d) => Some(d),
        }
    }

    pub fn into_file(self) -> Option<F> {
        match self {
            Item::File(f) => Some(f),
            Item::Folder(_) => None,
        }
    }

    pub fn into_folder(self) -> Option<D> {
        match self {
            Item::File(_) => None,
            Item::Folder(d) => Some(d),
        }
    }
}

#[async_trait]
impl<F, D> StorageItem for Item<F, D>
where
    F: StorageItem,
    D: StorageItem,
{
    fn name(&self) -> &str {
        match self {
            Item::File(f) => f.name(),
            Item::Folder(d) => d.name(),
        }
    }

    fn path(&self) -> &ItemPath {
        match self {
            Item::File(f) => f.path(),
            Item::Folder(d) => d.path(),
        }
    }

    fn kind(&self) -> ItemKind {
        match self {
            Item::File(_) => ItemKind::File,
            Item::Folder(_) => ItemKind::Folder,
        }
    }

    async fn properties(&self) -> StorageResult<ItemProperties> {
        match self {
            Item::File(f) => f.properties().await,
            Item::Folder(d) => d.properties().await,
        }
    }

    async fn delete(&self) -> StorageResult<()> {
        match self {
            Item::File(f) => f.delete().await,
            Item::Folder(d) => d.delete().await,
        }
    }

    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self> {
        match self {
            Item::File(f) => Ok(Item::File(f.rename(desired_name, option).await?)),
            Item::Folder(d) => Ok(Item::Folder(d.rename(desired_name, option).await?)),
        }
    }
}
