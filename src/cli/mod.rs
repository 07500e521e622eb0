//! Command-line front end
//!
//! Opens the configured backend and runs one command against its root.

pub mod commands;
pub mod handlers;

pub use commands::{Command, USAGE, parse_command};
pub use handlers::handle_command;

use log::info;

use crate::config::{BackendKind, StorageConfig};
use crate::error::CliError;
use crate::filesystem::LocalFolder;
use crate::memory::MemoryFolder;

/// Runs `command` on the backend selected by `config`
pub async fn run(config: &StorageConfig, command: Command) -> Result<Vec<String>, CliError> {
    info!("Running {:?} on {:?} backend", command, config.backend);
    match config.backend {
        BackendKind::Local => {
            let root = LocalFolder::from_config(config).await?;
            handle_command(&root, command, config.default_collision).await
        }
        BackendKind::Memory => {
            let root = MemoryFolder::with_limits(config.root.clone(), config.limits());
            handle_command(&root, command, config.default_collision).await
        }
    }
}
