//! Topic clustering handler

use crate::cli::output::print_clustering_report;
use crate::cli::output::print_info;
use crate::clustering::run_clustering;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::AppConfig;
use crate::Result;

pub async fn handle_cluster_command(config: &AppConfig) -> Result<()> {
    print_info(&format!(
        "🧩 Clustering past questions into {} topics...",
        config.clustering.num_clusters
    ));

    let database = Database::from_config(config).await?;
    let embedder = EmbeddingService::new(config)?;

    let report = run_clustering(&database, &embedder, &config.clustering).await?;
    print_clustering_report(&report);

    Ok(())
}
