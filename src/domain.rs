//! Domain models: bands, answer keys, submissions, and the per-attempt result record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// IELTS band, 0.0..=9.0 in half-point steps.
///
/// Stored as a count of half points so equality and averaging stay exact.
/// On the wire it is a plain JSON number (`6.5`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Band(u8);

impl Band {
  pub const ZERO: Band = Band(0);
  pub const MAX: Band = Band(18);

  /// Build from half points (13 => 6.5). Used by the static conversion table.
  pub const fn from_half_points(half: u8) -> Option<Band> {
    if half <= Self::MAX.0 { Some(Band(half)) } else { None }
  }

  /// Accepts only finite values within [0, 9] that sit on a 0.5 step.
  pub fn from_score(score: f64) -> Option<Band> {
    if !score.is_finite() || !(0.0..=9.0).contains(&score) {
      return None;
    }
    let doubled = score * 2.0;
    if doubled.fract() != 0.0 {
      return None;
    }
    Self::from_half_points(doubled as u8)
  }

  pub const fn half_points(self) -> u8 { self.0 }

  pub fn value(self) -> f64 { f64::from(self.0) / 2.0 }
}

impl fmt::Display for Band {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.1}", self.value())
  }
}

impl Serialize for Band {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.value())
  }
}

impl<'de> Deserialize<'de> for Band {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    Band::from_score(raw)
      .ok_or_else(|| serde::de::Error::custom(format!("band {raw} is not in 0..=9 with 0.5 steps")))
  }
}

/// Expected answers for the auto-graded sections, indexed by question order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
  #[serde(default)] pub listening: Vec<String>,
  #[serde(default)] pub reading: Vec<String>,
}

/// Rich-text writing answer as produced by the editor (may contain HTML markup).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub String);

impl RichText {
  pub fn as_str(&self) -> &str { &self.0 }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WritingAnswers {
  #[serde(default)] pub task1: RichText,
  #[serde(default)] pub task2: RichText,
}

/// Speaking section artifact. Never interpreted by the scoring core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeakingArtifact {
  /// Recording uploaded inline from the browser recorder.
  Inline {
    #[serde(default)]
    mime: String,
    #[serde(rename = "audioBase64")]
    audio_base64: String,
  },
  /// Reference to a recording stored elsewhere (blob URL, object key, ...).
  Reference(String),
  /// Anything else the recorder hands over, e.g. a browser `Blob` that serializes as `{}`.
  Opaque(serde_json::Value),
}

/// Everything the learner answered, one slot per section.
///
/// Unanswered listening/reading questions arrive as `null`. Multi-select questions
/// arrive as arrays and are kept as their comma-joined text (`["A","C"]` => `"A,C"`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
  #[serde(default, deserialize_with = "answer_slots")] pub listening: Vec<Option<String>>,
  #[serde(default, deserialize_with = "answer_slots")] pub reading: Vec<Option<String>>,
  #[serde(default)] pub writing: WritingAnswers,
  #[serde(default)] pub speaking: Option<SpeakingArtifact>,
}

fn answer_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Option<String>>, D::Error> {
  let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
  Ok(raw.iter().map(answer_text).collect())
}

/// Text of one answer slot. Objects and `null` count as unanswered.
fn answer_text(value: &serde_json::Value) -> Option<String> {
  use serde_json::Value;
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(match (n.as_i64(), n.as_f64()) {
      (Some(i), _) => i.to_string(),
      (None, Some(f)) => f.to_string(),
      (None, None) => n.to_string(),
    }),
    Value::Array(items) => Some(
      items
        .iter()
        .map(|item| match item {
          Value::Array(_) | Value::Object(_) | Value::Null => String::new(),
          other => answer_text(other).unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join(","),
    ),
    Value::Null | Value::Object(_) => None,
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
  Processing,
  Completed,
}

/// Raw counts (0..=40) and converted bands for the two auto-graded sections.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScores {
  pub listening: u32,
  pub listening_band: Band,
  pub reading: u32,
  pub reading_band: Band,
}

/// Examiner-supplied bands. Both absent until the attempt is graded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualScores {
  pub writing: Option<Band>,
  pub speaking: Option<Band>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WordCounts {
  pub task1: usize,
  pub task2: usize,
}

/// One learner attempt: created on submission, completed by the grading workflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
  pub attempt_id: String,
  pub user_id: String,
  pub test_id: String,
  pub submitted_at: DateTime<Utc>,
  pub answers: Answers,
  pub auto_scores: AutoScores,
  pub manual_scores: ManualScores,
  pub writing_word_counts: WordCounts,
  pub final_band: Option<Band>,
  pub status: AttemptStatus,
  #[serde(default)]
  pub graded_at: Option<DateTime<Utc>>,
}

/// Which sections a published test contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
  pub listening: bool,
  pub reading: bool,
  pub writing: bool,
  pub speaking: bool,
}

/// Public description of a test (never includes the answer key).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
  pub id: String,
  pub title: String,
  pub description: String,
  pub duration_minutes: u32,
  pub published: bool,
  pub sections: Sections,
}

/// In-progress answers saved while the learner is still taking the test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
  pub user_id: String,
  pub test_id: String,
  #[serde(default)]
  pub answers: Answers,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<serde_json::Value>,
  pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn band_accepts_half_steps_only() {
    assert_eq!(Band::from_score(6.5).map(Band::half_points), Some(13));
    assert_eq!(Band::from_score(0.0), Some(Band::ZERO));
    assert_eq!(Band::from_score(9.0), Some(Band::MAX));
    assert!(Band::from_score(6.3).is_none());
    assert!(Band::from_score(9.5).is_none());
    assert!(Band::from_score(-0.5).is_none());
    assert!(Band::from_score(f64::NAN).is_none());
  }

  #[test]
  fn band_serializes_as_number() {
    let band = Band::from_score(7.5).expect("band");
    assert_eq!(serde_json::to_string(&band).expect("json"), "7.5");
    assert_eq!(band.to_string(), "7.5");
    assert_eq!(Band::from_score(7.0).expect("band").to_string(), "7.0");
    let back: Band = serde_json::from_str("7.5").expect("parse");
    assert_eq!(back, band);
    assert!(serde_json::from_str::<Band>("7.25").is_err());
  }

  #[test]
  fn answers_accept_nulls_and_speaking_variants() {
    let json = r#"{
      "listening": ["a", null, "c"],
      "reading": [],
      "writing": { "task1": "<p>Hello world</p>" },
      "speaking": { "mime": "audio/webm", "audioBase64": "AAAA" }
    }"#;
    let answers: Answers = serde_json::from_str(json).expect("answers");
    assert_eq!(answers.listening, vec![Some("a".into()), None, Some("c".into())]);
    assert_eq!(answers.writing.task1.as_str(), "<p>Hello world</p>");
    assert_eq!(answers.writing.task2, RichText::default());
    assert!(matches!(answers.speaking, Some(SpeakingArtifact::Inline { .. })));

    let by_ref: Answers = serde_json::from_str(r#"{ "speaking": "blob:abc" }"#).expect("answers");
    assert_eq!(by_ref.speaking, Some(SpeakingArtifact::Reference("blob:abc".into())));

    let blob: Answers = serde_json::from_str(r#"{ "speaking": {} }"#).expect("answers");
    assert_eq!(blob.speaking, Some(SpeakingArtifact::Opaque(serde_json::json!({}))));
  }

  #[test]
  fn multi_select_and_scalar_answers_become_text() {
    let json = r#"{ "listening": [["A", "C"], 3, 2.5, true, {}, [], null, "b"] }"#;
    let answers: Answers = serde_json::from_str(json).expect("answers");
    assert_eq!(
      answers.listening,
      vec![
        Some("A,C".into()),
        Some("3".into()),
        Some("2.5".into()),
        Some("true".into()),
        None,
        Some(String::new()),
        None,
        Some("b".into()),
      ]
    );
    assert!(answers.reading.is_empty());
  }
}
