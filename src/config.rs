//! Loading service configuration (extra tests/answer keys + writing thresholds) from TOML.
//!
//! See `AppConfig` for the expected schema. Every field is optional; a missing or broken
//! file leaves the built-in defaults in place.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::catalog::TestEntry;
use crate::domain::AnswerKey;

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct AppConfig {
  #[serde(default)]
  pub writing: WritingThresholds,
  #[serde(default)]
  pub tests: Vec<TestCfg>,
}

/// Minimum word counts shown as feedback for the two writing tasks.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct WritingThresholds {
  #[serde(default = "default_task1_min_words")]
  pub task1_min_words: usize,
  #[serde(default = "default_task2_min_words")]
  pub task2_min_words: usize,
}

fn default_task1_min_words() -> usize { 150 }
fn default_task2_min_words() -> usize { 250 }

impl Default for WritingThresholds {
  fn default() -> Self {
    Self {
      task1_min_words: default_task1_min_words(),
      task2_min_words: default_task2_min_words(),
    }
  }
}

/// Test entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TestCfg {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default = "default_duration_minutes")] pub duration_minutes: u32,
  #[serde(default)] pub listening: Vec<String>,
  #[serde(default)] pub reading: Vec<String>,
}

fn default_duration_minutes() -> u32 { 165 }

impl TestCfg {
  pub fn into_entry(self) -> TestEntry {
    TestEntry::new(
      self.id,
      self.title,
      self.description,
      self.duration_minutes,
      AnswerKey { listening: self.listening, reading: self.reading },
    )
  }
}

/// Load `AppConfig` from a file. On any parsing/IO error, returns None.
pub fn load_config_from_path(path: &Path) -> Option<AppConfig> {
  let shown = path.display();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "ielts_backend", path = %shown, tests = cfg.tests.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "ielts_backend", path = %shown, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "ielts_backend", path = %shown, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Attempt to load `AppConfig` from IELTS_CONFIG_PATH.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("IELTS_CONFIG_PATH").ok()?;
  load_config_from_path(Path::new(&path))
}
