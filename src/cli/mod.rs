//! CLI module for the `helpdesk-rag` binary
//!
//! - Command line argument parsing
//! - Command handlers (one file per command group in handlers/)
//! - Output formatting

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::*;
pub use handlers::*;
pub use output::*;
