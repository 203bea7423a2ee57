//! Offline topic clustering of past questions
//!
//! Embeds every stored question, groups them with k-means and writes the
//! label back to each history row.

pub mod kmeans;

use serde::Serialize;
use tracing::info;

pub use kmeans::k_means;
pub use kmeans::KMeansResult;

use crate::config::ClusteringConfig;
use crate::embeddings::Embedder;
use crate::history::HistoryStore;
use crate::HelpdeskError;
use crate::Result;

/// Outcome of one clustering run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusteringReport {
    /// Number of questions that received a label
    pub questions: usize,
    pub clusters: usize,
    /// Members per cluster, indexed by label
    pub sizes: Vec<usize>,
}

impl ClusteringReport {
    fn skipped(clusters: usize) -> Self {
        Self {
            questions: 0,
            clusters,
            sizes: Vec::new(),
        }
    }
}

/// Cluster all stored questions and persist the labels.
///
/// With fewer questions than clusters nothing is written and the report
/// carries zero labelled questions.
///
/// # Errors
/// - History store read/write errors
/// - Embedding provider errors
pub async fn run_clustering(
    store: &dyn HistoryStore,
    embedder: &dyn Embedder,
    config: &ClusteringConfig,
) -> Result<ClusteringReport> {
    let k = config.num_clusters;
    if k == 0 {
        return Err(HelpdeskError::ClusteringError(
            "clustering.num_clusters must be at least 1".to_string(),
        ));
    }

    let records = store.list_questions().await?;
    if records.len() < k {
        info!(
            "Only {} questions stored, need at least {} to cluster; skipping",
            records.len(),
            k
        );
        return Ok(ClusteringReport::skipped(k));
    }

    info!("Embedding {} questions with {}", records.len(), embedder.model_id());
    let texts: Vec<String> = records.iter().map(|r| r.question.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != records.len() {
        return Err(HelpdeskError::ClusteringError(format!(
            "Expected {} embeddings, got {}",
            records.len(),
            embeddings.len()
        )));
    }

    let result = k_means(&embeddings, k, config.max_iterations)?;
    info!("k-means converged after {} iterations", result.iterations);

    let mut sizes = vec![0usize; k];
    let mut assignments = Vec::with_capacity(records.len());
    for (record, &label) in records.iter().zip(&result.labels) {
        sizes[label] += 1;
        assignments.push((record.id, i32::try_from(label).unwrap_or(i32::MAX)));
    }

    store.assign_clusters(&assignments).await?;

    let report = ClusteringReport {
        questions: records.len(),
        clusters: k,
        sizes,
    };
    info!(
        questions = report.questions,
        clusters = report.clusters,
        sizes = ?report.sizes,
        "Clustering complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::history::InMemoryHistoryStore;
    use crate::models::NewHistoryEntry;

    /// Maps printer questions to one corner and VPN questions to another
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            if lower.contains("printer") {
                Ok(vec![1.0, 0.0])
            } else if lower.contains("vpn") {
                Ok(vec![0.0, 1.0])
            } else {
                Ok(vec![0.5, 0.5])
            }
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn model_id(&self) -> &str {
            "keyword"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(HelpdeskError::EmbeddingError("offline".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(HelpdeskError::EmbeddingError("offline".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    async fn seed(store: &InMemoryHistoryStore, questions: &[&str]) {
        for question in questions {
            store
                .record(NewHistoryEntry {
                    username: "alice".to_string(),
                    question: (*question).to_string(),
                    answer: "ok".to_string(),
                    latency_ms: 10.0,
                    num_chunks: 1,
                    avg_distance: Some(0.2),
                })
                .await
                .unwrap();
        }
    }

    fn config(num_clusters: usize) -> ClusteringConfig {
        ClusteringConfig {
            num_clusters,
            max_iterations: 50,
        }
    }

    #[tokio::test]
    async fn test_clusters_by_topic_and_persists_labels() {
        let store = InMemoryHistoryStore::new();
        seed(
            &store,
            &[
                "Printer shows offline",
                "VPN will not connect",
                "Printer jams on page two",
                "VPN drops every hour",
            ],
        )
        .await;

        let report = run_clustering(&store, &KeywordEmbedder, &config(2))
            .await
            .unwrap();
        assert_eq!(report.questions, 4);
        assert_eq!(report.clusters, 2);
        assert_eq!(report.sizes.iter().sum::<usize>(), 4);
        assert_eq!(report.sizes, vec![2, 2]);

        let entries = store.entries();
        assert!(entries.iter().all(|e| e.cluster.is_some()));
        assert_eq!(entries[0].cluster, entries[2].cluster);
        assert_eq!(entries[1].cluster, entries[3].cluster);
        assert_ne!(entries[0].cluster, entries[1].cluster);
    }

    #[tokio::test]
    async fn test_too_few_questions_is_noop() {
        let store = InMemoryHistoryStore::new();
        seed(&store, &["Printer shows offline", "VPN will not connect"]).await;

        let report = run_clustering(&store, &KeywordEmbedder, &config(5))
            .await
            .unwrap();
        assert_eq!(report.questions, 0);
        assert!(report.sizes.is_empty());
        assert!(store.entries().iter().all(|e| e.cluster.is_none()));
    }

    #[tokio::test]
    async fn test_empty_history_is_noop() {
        let store = InMemoryHistoryStore::new();
        let report = run_clustering(&store, &KeywordEmbedder, &config(2))
            .await
            .unwrap();
        assert_eq!(report.questions, 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_labels_untouched() {
        let store = InMemoryHistoryStore::new();
        seed(&store, &["Printer shows offline", "VPN will not connect"]).await;

        let result = run_clustering(&store, &FailingEmbedder, &config(1)).await;
        assert!(matches!(result, Err(HelpdeskError::EmbeddingError(_))));
        assert!(store.entries().iter().all(|e| e.cluster.is_none()));
    }

    #[tokio::test]
    async fn test_zero_clusters_rejected() {
        let store = InMemoryHistoryStore::new();
        let result = run_clustering(&store, &KeywordEmbedder, &config(0)).await;
        assert!(matches!(result, Err(HelpdeskError::ClusteringError(_))));
    }
}
