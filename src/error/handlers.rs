//! Error handlers
//!
//! Logs command failures and maps them to process exit codes.

use crate::error::types::{CliError, StorageError};
use log::error;

/// Log a command failure
pub fn handle_error(err: &CliError) {
    error!("Command failed: {}", err);
}

/// Convert error to a process exit code
pub fn error_to_exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Usage(_) => 64,
        CliError::Config(_) => 78,
        CliError::Storage(e) => match e {
            StorageError::NotFound(_) => 2,
            StorageError::TypeMismatch { .. } => 3,
            StorageError::NameCollision(_) => 4,
            StorageError::InvalidName(_) | StorageError::InvalidPath(_) => 65,
            StorageError::PathTraversal(_) => 77,
            StorageError::InvalidData(_) => 65,
            StorageError::Backend(_) => 74,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(error_to_exit_code(&CliError::Usage("x".into())), 64);
        assert_eq!(
            error_to_exit_code(&CliError::Storage(StorageError::NotFound("a".into()))),
            2
        );
        assert_eq!(
            error_to_exit_code(&CliError::Storage(StorageError::NameCollision("a".into()))),
            4
        );
    }
}
