use super::Database;
use crate::HelpdeskError;
use crate::Result;

const REQUIRED_TABLES: [&str; 2] = ["document_chunks", "query_history"];

/// Valid on an empty table; ivfflat lists would be seeded from zero rows
const CHUNK_EMBEDDING_INDEX_SQL: &str = r"
    CREATE INDEX IF NOT EXISTS idx_document_chunks_embedding
    ON document_chunks USING hnsw (embedding vector_cosine_ops)
";

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        for table_name in REQUIRED_TABLES {
            let exists = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Verify database schema or return helpful error
    pub async fn verify_schema_or_error(&self) -> Result<()> {
        if !self.is_schema_initialized().await? {
            return Err(HelpdeskError::Custom(
                "Database schema not initialized!\n\n\
                 Please run the following command to initialize the database:\n\n\
                 \x1b[1;32mhelpdesk-rag init\x1b[0m"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Initialize database schema. Safe to run repeatedly.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        // Filled by the external ingestion process
        let create_chunks = format!(
            r"
            CREATE TABLE IF NOT EXISTS document_chunks (
                id BIGSERIAL PRIMARY KEY,
                chunk_id TEXT UNIQUE NOT NULL,
                content TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                embedding_model TEXT NOT NULL,
                embedding vector({}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
            self.embedding_dimension
        );
        sqlx::query(&create_chunks).execute(&self.pool).await?;

        sqlx::query(CHUNK_EMBEDDING_INDEX_SQL)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_document_chunks_model
            ON document_chunks (embedding_model)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS query_history (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                latency_ms DOUBLE PRECISION NOT NULL,
                num_chunks INTEGER NOT NULL,
                avg_distance DOUBLE PRECISION,
                cluster INTEGER,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_query_history_username
            ON query_history (username, created_at)
            ",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_index_is_hnsw_cosine() {
        assert!(CHUNK_EMBEDDING_INDEX_SQL.contains("USING hnsw"));
        assert!(CHUNK_EMBEDDING_INDEX_SQL.contains("vector_cosine_ops"));
        assert!(!CHUNK_EMBEDDING_INDEX_SQL.contains("ivfflat"));
    }
}
