//! Application state: test catalog, result repository, autosave drafts, writing thresholds.
//!
//! Built once at startup from the optional TOML config plus the built-in demo test,
//! then shared behind an `Arc` by every handler.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::catalog::{validate_answer_key, TestCatalog, TestEntry};
use crate::config::{load_config_from_env, AppConfig, WritingThresholds};
use crate::seeds::demo_test;
use crate::store::{DraftStore, InMemoryResultStore, ResultStore};

pub struct AppState {
    pub catalog: TestCatalog,
    pub results: Arc<dyn ResultStore>,
    pub drafts: DraftStore,
    pub writing: WritingThresholds,
}

impl AppState {
    /// Build state from env: load config, seed the demo test, use in-memory storage.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: AppConfig) -> Self {
        Self::with_store(cfg, Arc::new(InMemoryResultStore::new()))
    }

    pub fn with_store(cfg: AppConfig, results: Arc<dyn ResultStore>) -> Self {
        let mut entries: Vec<TestEntry> = Vec::new();

        // Config-based tests are listed before the demo.
        for tc in cfg.tests {
            let entry = tc.into_entry();
            if let Err(e) = validate_answer_key(&entry.answer_key) {
                error!(target: "ielts_backend", test_id = %entry.info.id, error = %e, "Skipping configured test");
                continue;
            }
            entries.push(entry);
        }
        // Built-in demo; a configured test with the same id wins.
        entries.push(demo_test());

        let catalog = TestCatalog::new(entries);
        info!(
            target: "ielts_backend",
            task1_min_words = cfg.writing.task1_min_words,
            task2_min_words = cfg.writing.task2_min_words,
            "Application state ready"
        );

        Self {
            catalog,
            results,
            drafts: DraftStore::new(),
            writing: cfg.writing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestCfg;
    use crate::seeds::DEMO_TEST_ID;

    #[tokio::test]
    async fn demo_test_is_always_available() {
        let state = AppState::from_config(AppConfig::default());
        let tests = state.catalog.list().await;
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, DEMO_TEST_ID);
    }

    #[tokio::test]
    async fn invalid_configured_keys_are_skipped() {
        let cfg = AppConfig {
            tests: vec![
                TestCfg {
                    id: "ok".into(),
                    title: "Ok".into(),
                    description: String::new(),
                    duration_minutes: 60,
                    listening: vec!["a".into()],
                    reading: vec![],
                },
                TestCfg {
                    id: "bad".into(),
                    title: "Bad".into(),
                    description: String::new(),
                    duration_minutes: 60,
                    listening: vec!["".into()],
                    reading: vec![],
                },
            ],
            ..AppConfig::default()
        };
        let state = AppState::from_config(cfg);
        assert!(state.catalog.get("ok").await.is_some());
        assert!(state.catalog.get("bad").await.is_none());
        assert!(state.catalog.get(DEMO_TEST_ID).await.is_some());
    }
}
