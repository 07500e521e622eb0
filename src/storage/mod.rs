//! Storage contract
//!
//! Backend-agnostic handles for folders, files and the items they contain,
//! together with collision handling and path validation.

pub mod collision;
pub mod file;
pub mod folder;
pub mod item;
pub mod results;
pub mod validation;

pub use collision::{CollisionResolution, CreationCollisionOption, resolve_collision};
pub use file::StorageFile;
pub use folder::{FolderItem, StorageFolder};
pub use item::{Item, ItemKind, StorageItem};
pub use results::ItemProperties;
pub use validation::{
    DEFAULT_MAX_NAME_LENGTH, ItemPath, PARTIAL_WRITE_SUFFIX, is_reserved_name, parse_relative,
    validate_name,
};
