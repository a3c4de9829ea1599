//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Accepting a submission: auto-grade listening/reading, convert to bands, persist
//!   - Grading an attempt: record examiner bands, compute the overall band, complete it
//!   - Result lookup, listing and deletion
//!   - Autosave drafts, word-count feedback, publishing new answer keys

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::TestEntry;
use crate::domain::{
  AnswerKey, AttemptResult, AttemptStatus, AutoScores, Band, Draft, ManualScores, SpeakingArtifact,
  TestInfo, WordCounts,
};
use crate::error::{GradingError, GradingResult};
use crate::protocol::{
  AutosaveIn, AutosaveOut, PublishTestIn, ResultsQuery, SubmitIn, SubmitOut, WordCountIn,
  WritingTask,
};
use crate::scoring::{auto_grade, band_for_raw, overall_band, validate_word_count, ComponentBands, WordCountCheck};
use crate::state::AppState;

#[instrument(level = "info", skip(state, body), fields(%test_id, user_id = %body.user_id))]
pub async fn submit_test(state: &AppState, test_id: &str, body: SubmitIn) -> GradingResult<SubmitOut> {
  let key = match state.catalog.answer_key(test_id).await {
    Ok(k) => k,
    Err(e) => {
      warn!(target: "grading", %test_id, error = %e, "Submission rejected");
      return Err(e);
    }
  };

  let answers = body.answers;
  let listening = auto_grade(&answers.listening, &key.listening);
  let reading = auto_grade(&answers.reading, &key.reading);
  let auto_scores = AutoScores {
    listening,
    listening_band: band_for_raw(listening),
    reading,
    reading_band: band_for_raw(reading),
  };
  let writing_word_counts = WordCounts {
    task1: answers.writing.task1.word_count(),
    task2: answers.writing.task2.word_count(),
  };
  let audio_bytes = speaking_audio_bytes(answers.speaking.as_ref());

  let attempt_id = format!("attempt-{}", Uuid::new_v4());
  let result = AttemptResult {
    attempt_id: attempt_id.clone(),
    user_id: body.user_id.clone(),
    test_id: test_id.to_string(),
    submitted_at: Utc::now(),
    answers,
    auto_scores,
    manual_scores: ManualScores::default(),
    writing_word_counts,
    final_band: None,
    status: AttemptStatus::Processing,
    graded_at: None,
  };
  state.results.save(result).await;
  state.drafts.remove(test_id, &body.user_id).await;

  info!(
    target: "grading",
    %attempt_id,
    %test_id,
    listening,
    listening_band = %auto_scores.listening_band,
    reading,
    reading_band = %auto_scores.reading_band,
    task1_words = writing_word_counts.task1,
    task2_words = writing_word_counts.task2,
    speaking_audio_bytes = audio_bytes.unwrap_or(0),
    "Submission auto-graded"
  );
  Ok(SubmitOut { attempt_id, status: AttemptStatus::Processing })
}

/// Records examiner bands and completes the attempt. Scores are checked before any
/// lookup so a rejected call never touches the store.
#[instrument(level = "info", skip(state), fields(%attempt_id))]
pub async fn grade_attempt(
  state: &AppState,
  attempt_id: &str,
  writing_score: f64,
  speaking_score: f64,
) -> GradingResult<AttemptResult> {
  let writing = manual_band("writing", writing_score)?;
  let speaking = manual_band("speaking", speaking_score)?;
  let graded_at = Utc::now();

  let updated = state
    .results
    .update(
      attempt_id,
      Box::new(move |r: &mut AttemptResult| {
        r.manual_scores = ManualScores { writing: Some(writing), speaking: Some(speaking) };
        r.final_band = overall_band(&ComponentBands::from(&*r));
        r.status = AttemptStatus::Completed;
        r.graded_at = Some(graded_at);
      }),
    )
    .await
    .ok_or_else(|| GradingError::AttemptNotFound(attempt_id.to_string()))?;

  info!(
    target: "grading",
    %attempt_id,
    %writing,
    %speaking,
    final_band = %updated.final_band.map(|b| b.to_string()).unwrap_or_default(),
    "Attempt graded"
  );
  Ok(updated)
}

fn manual_band(field: &'static str, value: f64) -> GradingResult<Band> {
  Band::from_score(value).ok_or(GradingError::InvalidScoreRange { field, value })
}

#[instrument(level = "debug", skip(state), fields(%attempt_id))]
pub async fn get_result(state: &AppState, attempt_id: &str) -> GradingResult<AttemptResult> {
  state
    .results
    .find_by_id(attempt_id)
    .await
    .ok_or_else(|| GradingError::AttemptNotFound(attempt_id.to_string()))
}

pub async fn list_results(state: &AppState, query: &ResultsQuery) -> Vec<AttemptResult> {
  state
    .results
    .list()
    .await
    .into_iter()
    .filter(|r| query.user_id.as_deref().map_or(true, |u| r.user_id == u))
    .filter(|r| query.test_id.as_deref().map_or(true, |t| r.test_id == t))
    .filter(|r| query.status.map_or(true, |s| r.status == s))
    .collect()
}

#[instrument(level = "info", skip(state), fields(%attempt_id))]
pub async fn delete_result(state: &AppState, attempt_id: &str) -> GradingResult<()> {
  state
    .results
    .delete(attempt_id)
    .await
    .map(|_| info!(target: "grading", %attempt_id, "Result deleted"))
    .ok_or_else(|| GradingError::AttemptNotFound(attempt_id.to_string()))
}

#[instrument(level = "debug", skip(state, body), fields(%test_id, user_id = %body.user_id))]
pub async fn autosave(state: &AppState, test_id: &str, body: AutosaveIn) -> GradingResult<AutosaveOut> {
  if state.catalog.get(test_id).await.is_none() {
    return Err(GradingError::AnswerKeyNotFound(test_id.to_string()));
  }
  if body.answers.is_none() && body.data.is_none() {
    warn!(target: "grading", %test_id, "Autosave rejected: empty body");
    return Err(GradingError::EmptyDraft(test_id.to_string()));
  }
  let saved_at = Utc::now();
  state
    .drafts
    .save(Draft {
      user_id: body.user_id,
      test_id: test_id.to_string(),
      answers: body.answers.unwrap_or_default(),
      data: body.data,
      saved_at,
    })
    .await;
  Ok(AutosaveOut { saved: true, ts: saved_at.timestamp_millis() })
}

pub async fn load_draft(state: &AppState, test_id: &str, user_id: &str) -> GradingResult<Draft> {
  state
    .drafts
    .get(test_id, user_id)
    .await
    .ok_or_else(|| GradingError::DraftNotFound {
      test_id: test_id.to_string(),
      user_id: user_id.to_string(),
    })
}

/// Explicit `minWords` wins; otherwise the configured minimum for the task (task 1 by default).
pub fn word_count(state: &AppState, body: &WordCountIn) -> WordCountCheck {
  let min_words = body.min_words.unwrap_or(match body.task.unwrap_or_default() {
    WritingTask::Task1 => state.writing.task1_min_words,
    WritingTask::Task2 => state.writing.task2_min_words,
  });
  validate_word_count(&body.text, min_words)
}

pub async fn publish_test(state: &AppState, body: PublishTestIn) -> GradingResult<TestInfo> {
  let id = body
    .id
    .filter(|id| !id.trim().is_empty())
    .unwrap_or_else(|| format!("test-{}", Uuid::new_v4()));
  let entry = TestEntry::new(
    id,
    body.title,
    body.description,
    body.duration_minutes,
    AnswerKey { listening: body.listening, reading: body.reading },
  );
  state.catalog.publish(entry).await
}

/// Decoded size of inline audio, for logs only. Accepts bare base64 or a data URL.
fn speaking_audio_bytes(artifact: Option<&SpeakingArtifact>) -> Option<usize> {
  let SpeakingArtifact::Inline { audio_base64, mime } = artifact? else {
    return None;
  };
  let payload = audio_base64
    .split_once("base64,")
    .map_or(audio_base64.as_str(), |(_, data)| data);
  match STANDARD.decode(payload.trim()) {
    Ok(bytes) => Some(bytes.len()),
    Err(e) => {
      warn!(target: "grading", %mime, error = %e, "Speaking audio is not valid base64; stored as-is");
      None
    }
  }
}
