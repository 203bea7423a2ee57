use pgvector::Vector;

use super::Database;
use crate::Result;

/// pgvector's own `hnsw.ef_search` default
const MIN_EF_SEARCH: i64 = 40;

/// Candidate list size for one search.
///
/// The model filter is applied after the index scan, so the candidate list
/// is kept well above `limit` to still yield `limit` rows.
pub(crate) fn ef_search_for(limit: i64) -> i64 {
    limit.saturating_mul(4).clamp(MIN_EF_SEARCH, 1000)
}

/// Raw nearest-neighbour hit from `document_chunks`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChunkSearchRow {
    pub chunk_id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    /// Cosine distance, 0 = identical direction
    pub distance: f64,
}

impl Database {
    /// Cosine nearest-neighbour search restricted to one embedding model's vectors
    pub async fn search_chunks(
        &self,
        query_embedding: Vec<f32>,
        embedding_model: &str,
        limit: i64,
    ) -> Result<Vec<ChunkSearchRow>> {
        let mut tx = self.pool.begin().await?;

        // SET LOCAL scope: reverts when the transaction ends
        sqlx::query("SELECT set_config('hnsw.ef_search', $1, true)")
            .bind(ef_search_for(limit).to_string())
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, ChunkSearchRow>(
            r"
            SELECT
                chunk_id,
                content,
                metadata,
                (embedding <=> $1) AS distance
            FROM document_chunks
            WHERE embedding_model = $2
            ORDER BY embedding <=> $1
            LIMIT $3
            ",
        )
        .bind(Vector::from(query_embedding))
        .bind(embedding_model)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }

    /// Number of chunks embedded with `embedding_model`
    pub async fn count_chunks(&self, embedding_model: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM document_chunks WHERE embedding_model = $1",
        )
        .bind(embedding_model)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_ef_search_covers_limit() {
        assert_eq!(ef_search_for(3), MIN_EF_SEARCH);
        assert_eq!(ef_search_for(50), 200);
        assert_eq!(ef_search_for(10_000), 1000);
        for k in 1..=250 {
            assert!(ef_search_for(k) >= k);
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL with pgvector configured in config.toml"]
    async fn test_small_manual_returns_top_k() -> Result<()> {
        let config = AppConfig::load()?;
        let db = Database::from_config(&config).await?;
        db.init_schema().await?;

        let dim = db.embedding_dimension();
        let model = format!("test-model-{}", uuid::Uuid::new_v4());
        for i in 0..5 {
            let mut embedding = vec![0.0_f32; dim];
            embedding[0] = 1.0;
            embedding[1 % dim] += i as f32 * 0.1;
            sqlx::query(
                r"
                INSERT INTO document_chunks (chunk_id, content, metadata, embedding_model, embedding)
                VALUES ($1, $2, '{}'::jsonb, $3, $4)
                ",
            )
            .bind(format!("{model}:{i}"))
            .bind(format!("Printer troubleshooting step {i}"))
            .bind(&model)
            .bind(Vector::from(embedding))
            .execute(&db.pool)
            .await?;
        }

        let mut query = vec![0.0_f32; dim];
        query[0] = 1.0;
        let rows = db.search_chunks(query, &model, 3).await?;
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].distance <= w[1].distance));

        sqlx::query("DELETE FROM document_chunks WHERE embedding_model = $1")
            .bind(&model)
            .execute(&db.pool)
            .await?;
        Ok(())
    }
}
