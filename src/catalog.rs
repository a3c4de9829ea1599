//! Published tests and their answer keys.
//!
//! Keys are immutable once published: the catalog only ever inserts.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::domain::{AnswerKey, Sections, TestInfo};
use crate::error::{GradingError, GradingResult};
use crate::scoring::MAX_RAW_SCORE;

#[derive(Clone, Debug, PartialEq)]
pub struct TestEntry {
    pub info: TestInfo,
    pub answer_key: AnswerKey,
}

impl TestEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        duration_minutes: u32,
        answer_key: AnswerKey,
    ) -> Self {
        let sections = Sections {
            listening: !answer_key.listening.is_empty(),
            reading: !answer_key.reading.is_empty(),
            writing: true,
            speaking: true,
        };
        Self {
            info: TestInfo {
                id: id.into(),
                title: title.into(),
                description: description.into(),
                duration_minutes,
                published: true,
                sections,
            },
            answer_key,
        }
    }
}

/// A key may hold at most 40 answers per section and no blank entries,
/// which keeps every raw score inside 0..=40.
pub fn validate_answer_key(key: &AnswerKey) -> GradingResult<()> {
    for (section, answers) in [("listening", &key.listening), ("reading", &key.reading)] {
        if answers.len() > MAX_RAW_SCORE as usize {
            return Err(GradingError::InvalidAnswerKey(format!(
                "{section} has {} answers, at most {MAX_RAW_SCORE} allowed",
                answers.len()
            )));
        }
        if let Some(pos) = answers.iter().position(|a| a.trim().is_empty()) {
            return Err(GradingError::InvalidAnswerKey(format!(
                "{section} answer {} is blank",
                pos + 1
            )));
        }
    }
    Ok(())
}

#[derive(Default)]
struct CatalogTable {
    by_id: HashMap<String, TestEntry>,
    order: Vec<String>,
}

#[derive(Default)]
pub struct TestCatalog {
    table: RwLock<CatalogTable>,
}

impl TestCatalog {
    /// Build from startup entries; later duplicates of an id are ignored.
    pub fn new(entries: impl IntoIterator<Item = TestEntry>) -> Self {
        let mut table = CatalogTable::default();
        for entry in entries {
            let id = entry.info.id.clone();
            if table.by_id.contains_key(&id) {
                continue;
            }
            table.order.push(id.clone());
            table.by_id.insert(id, entry);
        }
        Self { table: RwLock::new(table) }
    }

    pub async fn list(&self) -> Vec<TestInfo> {
        let table = self.table.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.by_id.get(id).map(|e| e.info.clone()))
            .collect()
    }

    pub async fn get(&self, test_id: &str) -> Option<TestInfo> {
        self.table.read().await.by_id.get(test_id).map(|e| e.info.clone())
    }

    pub async fn answer_key(&self, test_id: &str) -> GradingResult<AnswerKey> {
        self.table
            .read()
            .await
            .by_id
            .get(test_id)
            .map(|e| e.answer_key.clone())
            .ok_or_else(|| GradingError::AnswerKeyNotFound(test_id.to_string()))
    }

    #[instrument(level = "info", skip(self, entry), fields(test_id = %entry.info.id))]
    pub async fn publish(&self, entry: TestEntry) -> GradingResult<TestInfo> {
        validate_answer_key(&entry.answer_key)?;
        let mut table = self.table.write().await;
        let id = entry.info.id.clone();
        if table.by_id.contains_key(&id) {
            return Err(GradingError::TestAlreadyExists(id));
        }
        let info = entry.info.clone();
        table.order.push(id.clone());
        table.by_id.insert(id.clone(), entry);
        info!(
            target: "grading",
            test_id = %id,
            listening = info.sections.listening,
            reading = info.sections.reading,
            "Answer key published"
        );
        Ok(info)
    }
}
