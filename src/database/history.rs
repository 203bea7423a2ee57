use async_trait::async_trait;

use super::Database;
use crate::history::HistoryStore;
use crate::models::HistoryEntry;
use crate::models::NewHistoryEntry;
use crate::models::QuestionRecord;
use crate::HelpdeskError;
use crate::Result;

const HISTORY_COLUMNS: &str =
    "id, username, question, answer, latency_ms, num_chunks, avg_distance, cluster, created_at";

#[async_trait]
impl HistoryStore for Database {
    async fn record(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let sql = format!(
            r"
            INSERT INTO query_history
                (username, question, answer, latency_ms, num_chunks, avg_distance)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HISTORY_COLUMNS}
            "
        );

        let stored = sqlx::query_as::<_, HistoryEntry>(&sql)
            .bind(&entry.username)
            .bind(&entry.question)
            .bind(&entry.answer)
            .bind(entry.latency_ms)
            .bind(entry.num_chunks)
            .bind(entry.avg_distance)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn list_for_user(&self, username: &str) -> Result<Vec<HistoryEntry>> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM query_history WHERE username = $1 ORDER BY created_at, id"
        );

        let entries = sqlx::query_as::<_, HistoryEntry>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, question FROM query_history WHERE question <> '' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn question_exists(&self, question: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM query_history WHERE question = $1)",
        )
        .bind(question)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn assign_clusters(&self, assignments: &[(i64, i32)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, cluster) in assignments {
            let updated = sqlx::query("UPDATE query_history SET cluster = $1 WHERE id = $2")
                .bind(cluster)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if updated.rows_affected() == 0 {
                // Dropping `tx` rolls back the labels written so far
                return Err(HelpdeskError::HistoryNotFound(*id));
            }
        }

        tx.commit().await?;
        tracing::info!("Assigned clusters to {} history rows", assignments.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    async fn setup_test_db() -> Result<Database> {
        let config = AppConfig::load()?;
        let db = Database::from_config(&config).await?;
        db.init_schema().await?;
        Ok(db)
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL with pgvector configured in config.toml"]
    async fn test_record_and_list_history() -> Result<()> {
        let db = setup_test_db().await?;
        let username = format!("test_user_{}", uuid::Uuid::new_v4());

        let stored = db
            .record(NewHistoryEntry {
                username: username.clone(),
                question: "How do I boot into Safe Mode?".to_string(),
                answer: "Hold Shift while clicking Restart.".to_string(),
                latency_ms: 812.44,
                num_chunks: 3,
                avg_distance: Some(0.31),
            })
            .await?;
        assert!(stored.id > 0);
        assert_eq!(stored.cluster, None);

        let history = db.list_for_user(&username).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "How do I boot into Safe Mode?");
        assert!(db.question_exists("How do I boot into Safe Mode?").await?);

        db.assign_clusters(&[(stored.id, 4)]).await?;
        let history = db.list_for_user(&username).await?;
        assert_eq!(history[0].cluster, Some(4));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL with pgvector configured in config.toml"]
    async fn test_assign_clusters_unknown_id_rolls_back() -> Result<()> {
        let db = setup_test_db().await?;
        let username = format!("test_user_{}", uuid::Uuid::new_v4());
        let stored = db
            .record(NewHistoryEntry {
                username: username.clone(),
                question: "VPN says server not found".to_string(),
                answer: "Check the VPN profile address.".to_string(),
                latency_ms: 100.0,
                num_chunks: 1,
                avg_distance: None,
            })
            .await?;

        let result = db.assign_clusters(&[(stored.id, 1), (-1, 2)]).await;
        assert!(matches!(result, Err(HelpdeskError::HistoryNotFound(-1))));

        let history = db.list_for_user(&username).await?;
        assert_eq!(history[0].cluster, None);
        Ok(())
    }
}
