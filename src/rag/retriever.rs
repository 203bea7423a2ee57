//! Vector index over PostgreSQL + pgvector

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::warn;

use crate::database::ChunkSearchRow;
use crate::database::Database;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::rag::DocumentChunk;
use crate::rag::MetadataValue;
use crate::rag::RetrievedChunk;
use crate::rag::VectorIndex;

/// Semantic retriever: embeds the query, then asks pgvector for the nearest chunks
pub struct PgVectorIndex {
    database: Arc<Database>,
    embedder: Arc<dyn Embedder>,
}

impl PgVectorIndex {
    pub fn new(database: Arc<Database>, embedder: Arc<dyn Embedder>) -> Self {
        Self { database, embedder }
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn search(&self, query_text: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        debug!("Performing semantic search (k={}): {}", k, query_text);

        let query_embedding = self.embedder.embed(query_text).await?;

        // Only rows embedded by the same model share the query's vector space
        let rows = self
            .database
            .search_chunks(
                query_embedding,
                self.embedder.model_id(),
                i64::try_from(k).unwrap_or(i64::MAX),
            )
            .await?;

        Ok(rows_to_chunks(rows, k))
    }
}

/// Convert rows into ascending-distance hits, at most `k`
fn rows_to_chunks(rows: Vec<ChunkSearchRow>, k: usize) -> Vec<RetrievedChunk> {
    let mut chunks: Vec<RetrievedChunk> = rows
        .into_iter()
        .map(|row| RetrievedChunk {
            chunk: DocumentChunk {
                content: row.content,
                metadata: metadata_from_json(&row.chunk_id, row.metadata),
            },
            distance: row.distance as f32,
        })
        .collect();

    chunks.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    chunks.truncate(k);
    chunks
}

/// Keep scalar metadata only; nested values are dropped with a warning
fn metadata_from_json(
    chunk_id: &str,
    value: serde_json::Value,
) -> BTreeMap<String, MetadataValue> {
    let mut metadata = BTreeMap::new();
    metadata.insert("id".to_string(), MetadataValue::Text(chunk_id.to_string()));

    let serde_json::Value::Object(map) = value else {
        return metadata;
    };

    for (key, value) in map {
        let scalar = match value {
            serde_json::Value::Bool(b) => MetadataValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => MetadataValue::Integer(i),
                None => MetadataValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => MetadataValue::Text(s),
            serde_json::Value::Null => continue,
            other => {
                warn!("Dropping non-scalar metadata {key} on chunk {chunk_id}: {other}");
                continue;
            }
        };
        metadata.insert(key, scalar);
    }

    metadata
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(id: &str, content: &str, distance: f64) -> ChunkSearchRow {
        ChunkSearchRow {
            chunk_id: id.to_string(),
            content: content.to_string(),
            metadata: json!({"source": "data/manual.pdf", "page": 12}),
            distance,
        }
    }

    #[test]
    fn test_rows_sorted_by_ascending_distance() {
        let chunks = rows_to_chunks(
            vec![row("b", "second", 0.4), row("a", "first", 0.1), row("c", "third", 0.9)],
            3,
        );

        let contents: Vec<&str> = chunks.iter().map(|c| c.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rows_truncated_to_k() {
        let chunks = rows_to_chunks(vec![row("a", "a", 0.1), row("b", "b", 0.2)], 1);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_metadata_scalars_kept() {
        let metadata = metadata_from_json(
            "data/manual.pdf:12:0",
            json!({
                "source": "data/manual.pdf",
                "page": 12,
                "start_index": 1500,
                "confidence": 0.75,
                "scanned": false,
                "missing": null,
                "tags": ["printer"],
            }),
        );

        assert_eq!(
            metadata.get("id"),
            Some(&MetadataValue::Text("data/manual.pdf:12:0".into()))
        );
        assert_eq!(metadata.get("page"), Some(&MetadataValue::Integer(12)));
        assert_eq!(metadata.get("confidence"), Some(&MetadataValue::Float(0.75)));
        assert_eq!(metadata.get("scanned"), Some(&MetadataValue::Bool(false)));
        assert!(!metadata.contains_key("missing"));
        assert!(!metadata.contains_key("tags"));
    }

    #[test]
    fn test_non_object_metadata_yields_id_only() {
        let metadata = metadata_from_json("x", json!("not an object"));
        assert_eq!(metadata.len(), 1);
    }
}
