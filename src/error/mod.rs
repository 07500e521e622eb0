//! Error handling
//!
//! Defines error types and handling for storage operations and the CLI.

pub mod handlers;
pub mod types;

pub use types::*;
