//! Query history storage
//!
//! The HTTP layer, the CLI and clustering only see [`HistoryStore`];
//! `Database` is the PostgreSQL implementation and [`InMemoryHistoryStore`]
//! backs tests and database-less runs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::HistoryEntry;
use crate::models::NewHistoryEntry;
use crate::models::QuestionRecord;
use crate::HelpdeskError;
use crate::Result;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one exchange and return the stored row
    async fn record(&self, entry: NewHistoryEntry) -> Result<HistoryEntry>;

    /// All exchanges of one user, oldest first
    async fn list_for_user(&self, username: &str) -> Result<Vec<HistoryEntry>>;

    /// Every stored question, for clustering
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>>;

    /// Whether this exact question text was already answered
    async fn question_exists(&self, question: &str) -> Result<bool>;

    /// Write topic labels; all-or-nothing
    async fn assign_clusters(&self, assignments: &[(i64, i32)]) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored entry
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HistoryEntry>> {
        // Mutations are single pushes or field writes; a poisoned Vec is still consistent
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let mut entries = self.lock();
        let stored = HistoryEntry {
            id: entries.len() as i64 + 1,
            username: entry.username,
            question: entry.question,
            answer: entry.answer,
            latency_ms: entry.latency_ms,
            num_chunks: entry.num_chunks,
            avg_distance: entry.avg_distance,
            cluster: None,
            created_at: Utc::now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_user(&self, username: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .lock()
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect())
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>> {
        Ok(self
            .lock()
            .iter()
            .map(|e| QuestionRecord {
                id: e.id,
                question: e.question.clone(),
            })
            .collect())
    }

    async fn question_exists(&self, question: &str) -> Result<bool> {
        Ok(self.lock().iter().any(|e| e.question == question))
    }

    async fn assign_clusters(&self, assignments: &[(i64, i32)]) -> Result<()> {
        let mut entries = self.lock();
        if let Some((missing, _)) = assignments
            .iter()
            .find(|(id, _)| !entries.iter().any(|e| e.id == *id))
        {
            return Err(HelpdeskError::HistoryNotFound(*missing));
        }

        for (id, cluster) in assignments {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == *id) {
                entry.cluster = Some(*cluster);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, question: &str) -> NewHistoryEntry {
        NewHistoryEntry {
            username: username.to_string(),
            question: question.to_string(),
            answer: "answer".to_string(),
            latency_ms: 12.5,
            num_chunks: 2,
            avg_distance: Some(0.3),
        }
    }

    #[tokio::test]
    async fn test_record_and_list_per_user() {
        let store = InMemoryHistoryStore::new();
        store.record(entry("alice", "vpn down")).await.unwrap();
        store.record(entry("bob", "printer jam")).await.unwrap();
        store.record(entry("alice", "wifi slow")).await.unwrap();

        let alice = store.list_for_user("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].question, "vpn down");
        assert_eq!(alice[1].question, "wifi slow");
        assert!(alice.iter().all(|e| e.cluster.is_none()));
    }

    #[tokio::test]
    async fn test_question_exists() {
        let store = InMemoryHistoryStore::new();
        store.record(entry("alice", "vpn down")).await.unwrap();
        assert!(store.question_exists("vpn down").await.unwrap());
        assert!(!store.question_exists("VPN down").await.unwrap());
    }

    #[tokio::test]
    async fn test_assign_clusters_all_or_nothing() {
        let store = InMemoryHistoryStore::new();
        let first = store.record(entry("alice", "a")).await.unwrap();
        let second = store.record(entry("alice", "b")).await.unwrap();

        let err = store
            .assign_clusters(&[(first.id, 1), (999, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::HistoryNotFound(999)));
        assert!(store.entries().iter().all(|e| e.cluster.is_none()));

        store
            .assign_clusters(&[(first.id, 1), (second.id, 0)])
            .await
            .unwrap();
        let entries = store.entries();
        assert_eq!(entries[0].cluster, Some(1));
        assert_eq!(entries[1].cluster, Some(0));
    }
}
