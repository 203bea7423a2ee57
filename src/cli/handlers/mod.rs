//! CLI command handlers module
//!
//! - init: Database schema creation
//! - ask: One-off questions and bulk history population
//! - cluster: Topic clustering of past questions
//! - serve: API server
//! - info: History and configuration display

pub mod ask;
pub mod cluster;
pub mod info;
pub mod init;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use cluster::*;
pub use info::*;
pub use init::*;
pub use serve::*;
