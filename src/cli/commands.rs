//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "helpdesk-rag")]
#[command(about = "IT support assistant: answers questions from the support manual")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database schema and indexes
    Init,
    /// Start the HTTP query service
    Serve {
        /// Host to bind (default: server.host from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Answer one question
    Ask {
        /// The question to answer
        question: String,
        /// Record the exchange in this user's history
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Answer every question in a file and record them in history
    Populate {
        /// File with one question per line
        #[arg(short, long)]
        file: PathBuf,
        /// User the exchanges are recorded for
        #[arg(short, long)]
        user: String,
        /// Pause between questions in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },
    /// Group past questions into topics
    Cluster,
    /// Show a user's past questions
    History {
        /// Username to show
        #[arg(short, long)]
        user: String,
    },
    /// Show the effective configuration
    Config,
}
