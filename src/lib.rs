pub mod cli;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod memory;
pub mod storage;
pub mod utils;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use filesystem::{LocalFile, LocalFolder};
pub use memory::{MemoryFile, MemoryFolder};
pub use storage::{
    CreationCollisionOption, FolderItem, Item, ItemKind, ItemPath, ItemProperties, StorageFile,
    StorageFolder, StorageItem,
};
