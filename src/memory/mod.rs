//! In-memory backend
//!
//! Folders and files kept in a tree shared by every handle cloned from the
//! same root. Nothing is persisted.

mod file;
mod folder;
mod tree;

pub use file::MemoryFile;
pub use folder::MemoryFolder;
