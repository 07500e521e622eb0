//! storage-folder CLI - Entry Point
//!
//! Runs one folder operation against the configured storage backend.

use log::{error, info};
use std::process;

use storage_folder::cli::{self, parse_command};
use storage_folder::config::StorageConfig;
use storage_folder::error::handlers::{error_to_exit_code, handle_error};
use storage_folder::utils::setup_logging;

#[tokio::main]
async fn main() {
    let config = match StorageConfig::load() {
        Ok(config) => config,
        Err(e) => {
            setup_logging("error");
            error!("Failed to load configuration: {}", e);
            eprintln!("Configuration error: {}", e);
            process::exit(78);
        }
    };

    // env_logger picks up RUST_LOG, falling back to the configured level
    setup_logging(&config.log_level);
    info!("Storage root: {} ({:?} backend)", config.root, config.backend);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args);

    match cli::run(&config, command).await {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            handle_error(&e);
            eprintln!("{}", e);
            process::exit(error_to_exit_code(&e));
        }
    }
}
