//! Local disk file handle

use async_trait::async_trait;
use log::{debug, error, info};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StorageError, StorageResult};
use crate::filesystem::operations::{LocalRoot, partial_sibling};
use crate::storage::{
    CreationCollisionOption, ItemKind, ItemPath, ItemProperties, StorageFile, StorageItem,
};

#[derive(Debug, Clone)]
pub struct LocalFile {
    root: Arc<LocalRoot>,
    path: ItemPath,
    name: String,
}

impl LocalFile {
    pub(crate) fn new(root: Arc<LocalRoot>, path: ItemPath) -> Self {
        let name = path.name().unwrap_or_default().to_string();
        Self { root, path, name }
    }

    pub fn real_path(&self) -> PathBuf {
        self.root.real_path(&self.path)
    }
}

/// Writes `content` to a new reserved sibling of `target` and returns its path
async fn stage_write(target: &Path, content: &[u8]) -> io::Result<PathBuf> {
    loop {
        let partial = partial_sibling(target);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };

        let written = async {
            file.write_all(content).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        return Ok(partial);
    }
}

#[async_trait]
impl StorageItem for LocalFile {
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
        self.root.properties(&self.path, ItemKind::File).await
    }

    async fn delete(&self) -> StorageResult<()> {
        match self.root.entry_kind(&self.path).await? {
            None => return Err(StorageError::NotFound(self.path.to_string())),
            Some(ItemKind::Folder) => {
                return Err(StorageError::TypeMismatch {
                    path: self.path.to_string(),
                    expected: ItemKind::File,
                });
            }
            Some(ItemKind::File) => {}
        }
        self.root.remove(&self.path).await?;
        info!("Deleted file {}", self.path);
        Ok(())
    }

    async fn rename(
        &self,
        desired_name: &str,
        option: CreationCollisionOption,
    ) -> StorageResult<Self> {
        let new_path =
            super::rename_entry(&self.root, &self.path, ItemKind::File, desired_name, option)
                .await?;
        Ok(LocalFile::new(self.root.clone(), new_path))
    }
}

#[async_trait]
impl StorageFile for LocalFile {
    async fn read_bytes(&self) -> StorageResult<Vec<u8>> {
        self.root.expect_kind(&self.path, ItemKind::File).await?;
        let content = fs::read(self.real_path())
            .await
            .map_err(|e| StorageError::from_io(e, &self.path.to_string()))?;
        debug!("Read {} bytes from {}", content.len(), self.path);
        Ok(content)
    }

    /// Writes to a hidden sibling of the link target first, then renames it over the file.
    async fn write_bytes(&self, content: &[u8]) -> StorageResult<()> {
        self.root.expect_kind(&self.path, ItemKind::File).await?;
        let real = self.root.canonical(&self.path).await?;

        let partial = match stage_write(&real, content).await {
            Ok(partial) => partial,
            Err(e) => {
                error!("Failed to write {} (real: {}): {}", self.path, real.display(), e);
                return Err(StorageError::from_io(e, &self.path.to_string()));
            }
        };
        if let Err(e) = fs::rename(&partial, &real).await {
            error!("Failed to finalize {} (real: {}): {}", self.path, real.display(), e);
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::from_io(e, &self.path.to_string()));
        }

        debug!("Wrote {} bytes to {}", content.len(), self.path);
        Ok(())
    }
}
