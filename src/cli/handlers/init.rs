//! Database initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::AppConfig;
use crate::Result;

/// Handle database initialization command
pub async fn handle_init_command(config: &AppConfig) -> Result<()> {
    print_info("🗄️  Initializing helpdesk database...");

    let database = Database::from_config(config).await?;
    if let Err(e) = database.init_schema().await {
        if e.to_string().contains("vector") || e.to_string().contains("extension") {
            print_warning(&format!("Could not enable pgvector extension: {e}"));
            println!("  Run as a superuser: CREATE EXTENSION IF NOT EXISTS vector;");
        }
        return Err(e);
    }

    print_success("Tables document_chunks and query_history ready");
    print_success(&format!(
        "Vector column sized for {} dimensions ({})",
        config.embedding_dimension(),
        config.embedding_model()
    ));

    let chunks = database.count_chunks(config.embedding_model()).await?;
    if chunks == 0 {
        print_warning("No document chunks indexed yet for this embedding model");
    } else {
        print_info(&format!("{chunks} document chunks indexed"));
    }

    Ok(())
}
