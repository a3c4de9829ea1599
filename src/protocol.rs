//! Public HTTP request/response structs (serde ready).
//! Field names follow the front end's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::domain::{Answers, AttemptStatus, RichText};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIn {
    pub user_id: String,
    #[serde(default)]
    pub answers: Answers,
}
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub attempt_id: String,
    pub status: AttemptStatus,
}

/// Examiner bands for the manually graded sections, validated by the core.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeIn {
    pub writing_score: f64,
    pub speaking_score: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub user_id: Option<String>,
    pub test_id: Option<String>,
    pub status: Option<AttemptStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveIn {
    pub user_id: String,
    #[serde(default)]
    pub answers: Option<Answers>,
    /// Front-end progress payload (`{ writingDraft, progress }`), stored as-is.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
#[derive(Debug, Serialize, PartialEq)]
pub struct AutosaveOut {
    pub saved: bool,
    /// Epoch milliseconds of the save.
    pub ts: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveQuery {
    pub user_id: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WritingTask {
    #[default]
    Task1,
    Task2,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCountIn {
    pub text: RichText,
    pub min_words: Option<usize>,
    pub task: Option<WritingTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishTestIn {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub listening: Vec<String>,
    #[serde(default)]
    pub reading: Vec<String>,
}

fn default_duration_minutes() -> u32 {
    165
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
