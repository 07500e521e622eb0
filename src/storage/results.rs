//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::time::SystemTime;

use crate::storage::item::ItemKind;

/// Basic properties of a file or folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProperties {
    pub kind: ItemKind,
    /// Content length in bytes, zero for folders
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl ItemProperties {
    pub fn folder(modified: Option<SystemTime>) -> Self {
        Self {
            kind: ItemKind::Folder,
            size: 0,
            modified,
        }
    }

    pub fn file(size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            kind: ItemKind::File,
            size,
            modified,
        }
    }
}
