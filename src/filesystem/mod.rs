//! Local disk backend
//!
//! Folders and files under one root directory, accessed through `tokio::fs`.
//! Nothing resolves outside the root, including through symlinks.

mod file;
mod folder;
mod operations;

pub use file::LocalFile;
pub use folder::LocalFolder;

use log::{info, warn};
use std::collections::HashSet;
use tokio::fs;

use crate::error::{StorageError, StorageResult};
use crate::storage::{
    CollisionResolution, CreationCollisionOption, ItemKind, ItemPath, resolve_collision,
    validate_name,
};
use operations::LocalRoot;

/// Renames `path` within its parent, shared by files and folders.
async fn rename_entry(
    root: &LocalRoot,
    path: &ItemPath,
    kind: ItemKind,
    desired: &str,
    option: CreationCollisionOption,
) -> StorageResult<ItemPath> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
    validate_name(desired, root.limits.max_name_length)?;

    match root.entry_kind(path).await? {
        None => return Err(StorageError::NotFound(path.to_string())),
        Some(actual) if actual != kind => {
            return Err(StorageError::TypeMismatch {
                path: path.to_string(),
                expected: kind,
            });
        }
        Some(_) => {}
    }

    if path.name() == Some(desired) {
        return Ok(path.clone());
    }

    let option = match option {
        CreationCollisionOption::OpenIfExists => CreationCollisionOption::FailIfExists,
        other => other,
    };
    let existing = root.entry_kind(&parent.child(desired)).await?;
    let taken = match (existing, option) {
        (Some(_), CreationCollisionOption::GenerateUniqueName) => {
            root.child_names(&parent).await?
        }
        _ => HashSet::new(),
    };

    let max_length = root.limits.max_name_length;
    let resolution = resolve_collision(option, desired, kind, existing, max_length, |c| {
        taken.contains(c)
    })?;
    let (target, aside) = match resolution {
        CollisionResolution::Create(name) => (parent.child(&name), None),
        CollisionResolution::Replace(name) => {
            let target = parent.child(&name);
            // a file renamed over a file is replaced in place by `fs::rename`
            let aside = match (kind, existing) {
                (ItemKind::File, Some(ItemKind::File)) | (_, None) => None,
                _ => Some(root.stash(&target).await?),
            };
            (target, aside)
        }
        CollisionResolution::Open => {
            return Err(StorageError::NameCollision(desired.to_string()));
        }
    };

    let real_target = root.real_path(&target);
    if let Err(e) = fs::rename(root.real_path(path), &real_target).await {
        if let Some(aside) = &aside {
            if let Err(restore) = fs::rename(aside, &real_target).await {
                warn!(
                    "Could not restore {} from {}: {}",
                    target,
                    aside.display(),
                    restore
                );
            }
        }
        return Err(StorageError::from_io(e, &target.to_string()));
    }

    if let Some(aside) = aside {
        if let Err(e) = root.remove_real(&aside, &target.to_string()).await {
            warn!("Left replaced {} behind at {}: {}", target, aside.display(), e);
        }
    }

    info!("Renamed {} -> {}", path, target);
    Ok(target)
}
