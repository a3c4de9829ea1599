//! Storage collaborators: the result repository and the autosave draft store.
//!
//! The scoring core only talks to `ResultStore`; the in-memory implementation is what
//! the service runs with today.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::{AttemptResult, Draft};

/// In-place mutation applied to a stored result while the store holds its write lock.
pub type ResultUpdate = Box<dyn FnOnce(&mut AttemptResult) + Send>;

/// Repository of attempt results keyed by attempt id.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save(&self, result: AttemptResult);

    async fn find_by_id(&self, attempt_id: &str) -> Option<AttemptResult>;

    /// All results, oldest submission first.
    async fn list(&self) -> Vec<AttemptResult>;

    /// Applies `apply` to the stored record and returns the updated copy.
    /// Returns `None` (and applies nothing) when the id is unknown.
    async fn update(&self, attempt_id: &str, apply: ResultUpdate) -> Option<AttemptResult>;

    async fn delete(&self, attempt_id: &str) -> Option<AttemptResult>;
}

#[derive(Default)]
struct ResultTable {
    by_id: HashMap<String, AttemptResult>,
    order: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryResultStore {
    table: RwLock<ResultTable>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    #[instrument(level = "debug", skip(self, result), fields(attempt_id = %result.attempt_id))]
    async fn save(&self, result: AttemptResult) {
        let mut table = self.table.write().await;
        let id = result.attempt_id.clone();
        if table.by_id.insert(id.clone(), result).is_none() {
            table.order.push(id);
        }
    }

    async fn find_by_id(&self, attempt_id: &str) -> Option<AttemptResult> {
        self.table.read().await.by_id.get(attempt_id).cloned()
    }

    async fn list(&self) -> Vec<AttemptResult> {
        let table = self.table.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.by_id.get(id).cloned())
            .collect()
    }

    #[instrument(level = "debug", skip(self, apply))]
    async fn update(&self, attempt_id: &str, apply: ResultUpdate) -> Option<AttemptResult> {
        let mut table = self.table.write().await;
        let record = table.by_id.get_mut(attempt_id)?;
        apply(record);
        Some(record.clone())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, attempt_id: &str) -> Option<AttemptResult> {
        let mut table = self.table.write().await;
        let removed = table.by_id.remove(attempt_id)?;
        table.order.retain(|id| id != attempt_id);
        debug!(target: "grading", %attempt_id, "Result removed from store");
        Some(removed)
    }
}

/// Latest autosaved answers per (test, user). Best effort, lost on restart.
#[derive(Default)]
pub struct DraftStore {
    drafts: RwLock<HashMap<(String, String), Draft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save(&self, draft: Draft) {
        let key = (draft.test_id.clone(), draft.user_id.clone());
        self.drafts.write().await.insert(key, draft);
    }

    pub async fn get(&self, test_id: &str, user_id: &str) -> Option<Draft> {
        let key = (test_id.to_string(), user_id.to_string());
        self.drafts.read().await.get(&key).cloned()
    }

    pub async fn remove(&self, test_id: &str, user_id: &str) -> Option<Draft> {
        let key = (test_id.to_string(), user_id.to_string());
        self.drafts.write().await.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answers, AttemptStatus, AutoScores, Band, ManualScores, WordCounts};
    use chrono::Utc;

    fn result(id: &str) -> AttemptResult {
        AttemptResult {
            attempt_id: id.into(),
            user_id: "user-1".into(),
            test_id: "demo-1".into(),
            submitted_at: Utc::now(),
            answers: Answers::default(),
            auto_scores: AutoScores {
                listening: 0,
                listening_band: Band::ZERO,
                reading: 0,
                reading_band: Band::ZERO,
            },
            manual_scores: ManualScores::default(),
            writing_word_counts: WordCounts::default(),
            final_band: None,
            status: AttemptStatus::Processing,
            graded_at: None,
        }
    }

    #[tokio::test]
    async fn list_keeps_submission_order() {
        let store = InMemoryResultStore::new();
        store.save(result("b")).await;
        store.save(result("a")).await;
        store.save(result("b")).await;
        let ids: Vec<_> = store.list().await.into_iter().map(|r| r.attempt_id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn update_unknown_id_applies_nothing() {
        let store = InMemoryResultStore::new();
        let touched = store
            .update("missing", Box::new(|r| r.status = AttemptStatus::Completed))
            .await;
        assert!(touched.is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_roundtrip() {
        let store = InMemoryResultStore::new();
        store.save(result("x")).await;
        let updated = store
            .update("x", Box::new(|r| r.status = AttemptStatus::Completed))
            .await
            .expect("updated");
        assert_eq!(updated.status, AttemptStatus::Completed);
        assert_eq!(store.find_by_id("x").await, Some(updated));
        assert!(store.delete("x").await.is_some());
        assert!(store.find_by_id("x").await.is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn drafts_are_per_user_and_test() {
        let drafts = DraftStore::new();
        drafts
            .save(Draft {
                user_id: "u1".into(),
                test_id: "t1".into(),
                answers: Answers::default(),
                data: None,
                saved_at: Utc::now(),
            })
            .await;
        assert!(drafts.get("t1", "u1").await.is_some());
        assert!(drafts.get("t1", "u2").await.is_none());
        assert!(drafts.remove("t1", "u1").await.is_some());
        assert!(drafts.get("t1", "u1").await.is_none());
    }
}
