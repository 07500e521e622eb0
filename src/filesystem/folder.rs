//! Local disk folder handle

use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use crate::config::{BackendLimits, StorageConfig};
use crate::error::{StorageError, StorageResult};
use crate::filesystem::file::LocalFile;
use crate::filesystem::operations::LocalRoot;
use crate::storage::{
    CollisionResolution, CreationCollisionOption, FolderItem, Item, ItemKind, ItemPath,
    ItemProperties, StorageFolder, StorageItem, parse_relative, resolve_collision, validate_name,
};

/// Directory on local disk, sandboxed under the backend root
#[derive(Debug, Clone)]
pub struct LocalFolder {
    root: Arc<LocalRoot>,
    path: ItemPath,
    name: String,
}

impl LocalFolder {
    /// Opens `root` as the root folder of a local backend.
    ///
    /// With `create` set, missing directories are created first.
    pub async fn open(
        root: impl AsRef<Path>,
        limits: BackendLimits,
        create: bool,
    ) -> StorageResult<Self> {
        let root = root.as_ref();
        let display = root.display().to_string();

        if create {
            fs::create_dir_all(root).await?;
        }

        let base = fs::canonicalize(root)
            .await
            .map_err(|e| StorageError::from_io(e, &display))?;
        let metadata = fs::metadata(&base)
            .await
            .map_err(|e| StorageError::from_io(e, &display))?;
        if !metadata.is_dir() {
            return Err(StorageError::TypeMismatch {
                path: display,
                expected: ItemKind::Folder,
            });
        }

        let name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());
        info!("Opened local storage root {}", base.display());

        Ok(Self {
            root: Arc::new(LocalRoot { base, limits }),
            path: ItemPath::root(),
            name,
        })
    }

    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        Self::open(config.root_path(), config.limits(), config.create_root).await
    }

    /// Directory this handle points at on disk
    pub fn real_path(&self) -> std::path::PathBuf {
        self.root.real_path(&self.path)
    }

    fn folder_at(&self, path: ItemPath) -> LocalFolder {
        LocalFolder {
            root: self.root.clone(),
            name: path.name().unwrap_or(&self.name).to_string(),
            path,
        }
    }

    fn file_at(&self, path: ItemPath) -> LocalFile {
        LocalFile::new(self.root.clone(), path)
    }

    fn item_at(&self, path: ItemPath, kind: ItemKind) -> FolderItem<Self> {
        match kind {
            ItemKind::File => Item::File(self.file_at(path)),
            ItemKind::Folder => Item::Folder(self.folder_at(path)),
        }
    }

    /// Applies the collision option for a new child.
    ///
    /// Returns the path to create, or `None` when the existing child is reused.
    async fn claim_child(
        &self,
        desired: &str,
        kind: ItemKind,
        option: CreationCollisionOption,
    ) -> StorageResult<Option<ItemPath>> {
        validate_name(desired, self.root.limits.max_name_length)?;
        self.root.expect_kind(&self.path, ItemKind::Folder).await?;

        let existing = self.root.entry_kind(&self.path.child(desired)).await?;
        let taken = match (existing, option) {
            (Some(_), CreationCollisionOption::GenerateUniqueName) => {
                self.root.child_names(&self.path).await?
            }
            _ => HashSet::new(),
        };

        let max_length = self.root.limits.max_name_length;
        match resolve_collision(option, desired, kind, existing, max_length, |c| {
            taken.contains(c)
        })? {
            CollisionResolution::Create(name) => Ok(Some(self.path.child(&name))),
            CollisionResolution::Replace(name) => {
                let path = self.path.child(&name);
                if existing.is_some() {
                    self.root.remove(&path).await?;
                }
                Ok(Some(path))
            }
            CollisionResolution::Open => Ok(None),
        }
    }
}

#[async_trait]
impl StorageItem for LocalFolder {
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
        self.root.properties(&self.path, ItemKind::Folder).await
    }

    async fn delete(&self) -> StorageResult<()> {
        if self.path.is_root() {
            return Err(StorageError::InvalidPath(self.path.to_string()));
        }
        self.root.expect_kind(&self.path, ItemKind::Folder).await?;
        self.root.remove(&self.path).await?;
        info!("Deleted folder {}", self.path);
        Ok(())
    }

    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self> {
        let new_path =
            super::rename_entry(&self.root, &self.path, ItemKind::Folder, desired_name, option)
                .await?;
        Ok(self.folder_at(new_path))
    }
}

#[async_trait]
impl StorageFolder for LocalFolder {
    type File = LocalFile;

    async fn create_file_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<LocalFile> {
        let Some(path) = self.claim_child(desired_name, ItemKind::File, option).await? else {
            debug!("Opened existing file {}", self.path.child(desired_name));
            return Ok(self.file_at(self.path.child(desired_name)));
        };

        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.real_path(&path))
            .await
            .map_err(|e| StorageError::from_io(e, &path.to_string()))?;

        info!("Created file {} ({})", path, option);
        Ok(self.file_at(path))
    }

    async fn create_folder_with(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<LocalFolder> {
        let Some(path) = self
            .claim_child(desired_name, ItemKind::Folder, option)
            .await?
        else {
            debug!("Opened existing folder {}", self.path.child(desired_name));
            return Ok(self.folder_at(self.path.child(desired_name)));
        };

        fs::create_dir(self.root.real_path(&path))
            .await
            .map_err(|e| StorageError::from_io(e, &path.to_string()))?;

        info!("Created folder {} ({})", path, option);
        Ok(self.folder_at(path))
    }

    async fn get_item(&self, path: &str) -> StorageResult<FolderItem<Self>> {
        let segments = parse_relative(path)?;
        let target = self.path.join(&segments);
        let kind = self.root.kind_at(&target).await?;
        debug!("Resolved {} to {} {}", path, kind, target);
        Ok(self.item_at(target, kind))
    }

    async fn get_items(&self) -> StorageResult<Vec<FolderItem<Self>>> {
        self.root.expect_kind(&self.path, ItemKind::Folder).await?;
        let entries = self.root.list(&self.path).await?;
        Ok(entries
            .into_iter()
            .map(|(name, kind)| self.item_at(self.path.child(&name), kind))
            .collect())
    }
}
