//! Error types
//!
//! Defines the storage error taxonomy and the errors surfaced by the CLI.

use std::fmt;
use std::io;

use crate::storage::ItemKind;

/// Result alias used by every storage operation
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    /// A strict lookup could not resolve the path
    NotFound(String),
    /// The path resolved to an item of the other kind
    TypeMismatch { path: String, expected: ItemKind },
    /// The desired name already exists and the policy forbids reuse
    NameCollision(String),
    InvalidName(String),
    InvalidPath(String),
    PathTraversal(String),
    InvalidData(String),
    /// Opaque backend fault
    Backend(io::Error),
}

impl StorageError {
    /// True when the error only reports absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    /// Classifies an I/O error raised while touching `path`.
    ///
    /// `NotFound` and `AlreadyExists` carry meaning for the contract, anything
    /// else stays an opaque backend fault.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                StorageError::NotFound(path.to_string())
            }
            io::ErrorKind::AlreadyExists => StorageError::NameCollision(path.to_string()),
            _ => StorageError::Backend(error),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Item not found: {}", p),
            StorageError::TypeMismatch { path, expected } => {
                write!(f, "Expected a {} at {}", expected, path)
            }
            StorageError::NameCollision(n) => write!(f, "Name already exists: {}", n),
            StorageError::InvalidName(n) => write!(f, "Invalid name: {}", n),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            StorageError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            StorageError::Backend(e) => write!(f, "Backend error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Backend(error)
    }
}

/// Command-line errors
#[derive(Debug)]
pub enum CliError {
    Config(config::ConfigError),
    Storage(StorageError),
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Storage(e) => write!(f, "Storage error: {}", e),
            CliError::Usage(msg) => write!(f, "Usage error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<config::ConfigError> for CliError {
    fn from(error: config::ConfigError) -> Self {
        CliError::Config(error)
    }
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        CliError::Storage(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(StorageError::from_io(missing, "a.txt").is_not_found());

        let exists = io::Error::new(io::ErrorKind::AlreadyExists, "taken");
        assert!(matches!(
            StorageError::from_io(exists, "a.txt"),
            StorageError::NameCollision(name) if name == "a.txt"
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from_io(denied, "a.txt"),
            StorageError::Backend(_)
        ));
    }

    #[test]
    fn test_display_messages() {
        let err = StorageError::TypeMismatch {
            path: "docs".into(),
            expected: ItemKind::File,
        };
        assert_eq!(err.to_string(), "Expected a file at docs");
        assert_eq!(
            StorageError::NameCollision("a.txt".into()).to_string(),
            "Name already exists: a.txt"
        );
    }
}
