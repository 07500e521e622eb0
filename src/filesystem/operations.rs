//! Local disk operations
//!
//! Path mapping, metadata lookups, listing and removal for the local backend.
//! Listing and removal retry transient permission failures.

use log::{debug, error, warn};
use std::collections::HashSet;
use std::fs::Metadata;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;

use crate::config::BackendLimits;
use crate::error::{StorageError, StorageResult};
use crate::storage::{ItemKind, ItemPath, ItemProperties, PARTIAL_WRITE_SUFFIX, is_reserved_name};

static NEXT_PARTIAL: AtomicU64 = AtomicU64::new(0);

/// Fresh reserved sibling name for `target`, unique within this process
pub(crate) fn partial_sibling(target: &Path) -> PathBuf {
    let nonce = NEXT_PARTIAL.fetch_add(1, Ordering::Relaxed);
    target.with_file_name(format!(
        ".{}-{}{}",
        std::process::id(),
        nonce,
        PARTIAL_WRITE_SUFFIX
    ))
}

/// Runs `op`, retrying `PermissionDenied` up to `retries` times with linear back-off
pub(crate) async fn with_retries<T, F, Fut>(
    retries: usize,
    action: &str,
    mut op: F,
) -> io::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt <= retries && e.kind() == io::ErrorKind::PermissionDenied => {
                warn!(
                    "Transient failure to {} (attempt {}/{}): {}. Retrying...",
                    action, attempt, retries, e
                );
                tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Canonical root directory shared by every handle of one local backend
#[derive(Debug)]
pub(crate) struct LocalRoot {
    pub(crate) base: PathBuf,
    pub(crate) limits: BackendLimits,
}

fn kind_of(metadata: &Metadata) -> ItemKind {
    if metadata.is_dir() {
        ItemKind::Folder
    } else {
        ItemKind::File
    }
}

impl LocalRoot {
    pub(crate) fn real_path(&self, path: &ItemPath) -> PathBuf {
        let mut real = self.base.clone();
        for segment in path.segments() {
            real.push(segment);
        }
        real
    }

    /// Real location of `path` with symlinks resolved, refusing anything outside the root
    pub(crate) async fn canonical(&self, path: &ItemPath) -> StorageResult<PathBuf> {
        let display = path.to_string();
        let canonical = fs::canonicalize(self.real_path(path))
            .await
            .map_err(|e| StorageError::from_io(e, &display))?;
        if !canonical.starts_with(&self.base) {
            warn!(
                "Refusing {} (resolves outside the root to {})",
                display,
                canonical.display()
            );
            return Err(StorageError::PathTraversal(display));
        }
        Ok(canonical)
    }

    /// Metadata of `path` with symlinks followed
    pub(crate) async fn stat(&self, path: &ItemPath) -> StorageResult<Metadata> {
        let canonical = self.canonical(path).await?;
        fs::metadata(&canonical)
            .await
            .map_err(|e| StorageError::from_io(e, &path.to_string()))
    }

    pub(crate) async fn kind_at(&self, path: &ItemPath) -> StorageResult<ItemKind> {
        Ok(kind_of(&self.stat(path).await?))
    }

    /// Metadata of `path`, which must be of `kind`
    pub(crate) async fn expect_kind(
        &self,
        path: &ItemPath,
        kind: ItemKind,
    ) -> StorageResult<Metadata> {
        let metadata = self.stat(path).await?;
        if kind_of(&metadata) != kind {
            return Err(StorageError::TypeMismatch {
                path: path.to_string(),
                expected: kind,
            });
        }
        Ok(metadata)
    }

    pub(crate) async fn properties(
        &self,
        path: &ItemPath,
        kind: ItemKind,
    ) -> StorageResult<ItemProperties> {
        let metadata = self.expect_kind(path, kind).await?;
        let modified = metadata.modified().ok();
        Ok(match kind {
            ItemKind::File => ItemProperties::file(metadata.len(), modified),
            ItemKind::Folder => ItemProperties::folder(modified),
        })
    }

    /// Kind of whatever occupies the name `path`, if anything.
    ///
    /// Links inside the root report their target's kind, as lookups do.
    /// Dangling or escaping links still occupy the name and report `File`.
    pub(crate) async fn entry_kind(&self, path: &ItemPath) -> StorageResult<Option<ItemKind>> {
        let metadata = match fs::symlink_metadata(self.real_path(path)).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_io(e, &path.to_string())),
        };
        if !metadata.file_type().is_symlink() {
            return Ok(Some(kind_of(&metadata)));
        }

        match self.kind_at(path).await {
            Ok(kind) => Ok(Some(kind)),
            Err(e) => {
                debug!("Link {} does not resolve: {}", path, e);
                Ok(Some(ItemKind::File))
            }
        }
    }

    /// Direct children of `path` with their kinds, sorted by name
    pub(crate) async fn list(&self, path: &ItemPath) -> StorageResult<Vec<(String, ItemKind)>> {
        let real = self.real_path(path);
        let display = path.to_string();

        let mut dir = with_retries(self.limits.io_retries, "list directory", || {
            fs::read_dir(&real)
        })
        .await
        .map_err(|e| {
            error!("Failed to list {} (real: {}): {}", display, real.display(), e);
            StorageError::from_io(e, &display)
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(e, &display))?
        {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!("Skipping non UTF-8 entry {:?} in {}", raw, display);
                    continue;
                }
            };
            if is_reserved_name(&name) {
                continue;
            }

            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::from_io(e, &display))?;
            let kind = if file_type.is_symlink() {
                match self.kind_at(&path.child(&name)).await {
                    Ok(kind) => kind,
                    Err(e) => {
                        warn!("Skipping link {} in {}: {}", name, display, e);
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                ItemKind::Folder
            } else {
                ItemKind::File
            };
            entries.push((name, kind));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(
            "Listed {} (real: {}) - {} entries",
            display,
            real.display(),
            entries.len()
        );
        Ok(entries)
    }

    /// Every name held in the directory at `path`, including entries `list` skips
    pub(crate) async fn child_names(&self, path: &ItemPath) -> StorageResult<HashSet<String>> {
        let display = path.to_string();
        let mut dir = fs::read_dir(self.real_path(path))
            .await
            .map_err(|e| StorageError::from_io(e, &display))?;

        let mut names = HashSet::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(e, &display))?
        {
            // a non UTF-8 name can never equal a generated candidate
            if let Ok(name) = entry.file_name().into_string() {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Removes whatever is at `path`, recursively when it is a folder.
    ///
    /// A symlink is removed itself, never its target.
    pub(crate) async fn remove(&self, path: &ItemPath) -> StorageResult<()> {
        self.remove_real(&self.real_path(path), &path.to_string()).await
    }

    pub(crate) async fn remove_real(&self, real: &Path, display: &str) -> StorageResult<()> {
        let retries = self.limits.io_retries;
        let metadata = fs::symlink_metadata(real)
            .await
            .map_err(|e| StorageError::from_io(e, display))?;

        let result = if metadata.is_dir() {
            with_retries(retries, "remove folder", || fs::remove_dir_all(real)).await
        } else {
            with_retries(retries, "remove file", || fs::remove_file(real)).await
        };

        result.map_err(|e| {
            error!("Failed to remove {} (real: {}): {}", display, real.display(), e);
            StorageError::from_io(e, display)
        })
    }

    /// Moves whatever is at `path` to a reserved sibling and returns its location
    pub(crate) async fn stash(&self, path: &ItemPath) -> StorageResult<PathBuf> {
        let real = self.real_path(path);
        let mut aside = partial_sibling(&real);
        while fs::symlink_metadata(&aside).await.is_ok() {
            aside = partial_sibling(&real);
        }

        fs::rename(&real, &aside)
            .await
            .map_err(|e| StorageError::from_io(e, &path.to_string()))?;
        debug!("Moved {} aside to {}", path, aside.display());
        Ok(aside)
    }
}
