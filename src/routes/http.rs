//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; core errors and malformed requests render through `ApiError`.

use std::sync::Arc;
use axum::{
  extract::{FromRequest, FromRequestParts, Path, Query, State},
  http::{header, StatusCode},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::{AnswerKey, AttemptResult, Draft, TestInfo};
use crate::error::{ApiError, GradingError};
use crate::export::{results_csv, CSV_FILENAME};
use crate::logic::*;
use crate::protocol::*;
use crate::scoring::WordCountCheck;
use crate::state::AppState;
use crate::stats::{summarize, StatsSummary};

type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections come back as `{ error, message }`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query-string counterpart of [`ApiJson`].
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_tests(State(state): State<Arc<AppState>>) -> Json<Vec<TestInfo>> {
  Json(state.catalog.list().await)
}

#[instrument(level = "info", skip(state), fields(%test_id))]
pub async fn http_get_test(
  State(state): State<Arc<AppState>>,
  Path(test_id): Path<String>,
) -> ApiResult<Json<TestInfo>> {
  let info = state
    .catalog
    .get(&test_id)
    .await
    .ok_or(GradingError::TestNotFound(test_id))?;
  Ok(Json(info))
}

#[instrument(level = "info", skip(state), fields(%test_id))]
pub async fn http_get_answer_key(
  State(state): State<Arc<AppState>>,
  Path(test_id): Path<String>,
) -> ApiResult<Json<AnswerKey>> {
  Ok(Json(state.catalog.answer_key(&test_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%test_id, user_id = %body.user_id))]
pub async fn http_submit_test(
  State(state): State<Arc<AppState>>,
  Path(test_id): Path<String>,
  ApiJson(body): ApiJson<SubmitIn>,
) -> ApiResult<Json<SubmitOut>> {
  let out = submit_test(&state, &test_id, body).await?;
  info!(target: "grading", %test_id, attempt_id = %out.attempt_id, "HTTP submission accepted");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%test_id, user_id = %body.user_id))]
pub async fn http_post_autosave(
  State(state): State<Arc<AppState>>,
  Path(test_id): Path<String>,
  ApiJson(body): ApiJson<AutosaveIn>,
) -> ApiResult<Json<AutosaveOut>> {
  Ok(Json(autosave(&state, &test_id, body).await?))
}

#[instrument(level = "info", skip(state), fields(%test_id, user_id = %q.user_id))]
pub async fn http_get_autosave(
  State(state): State<Arc<AppState>>,
  Path(test_id): Path<String>,
  ApiQuery(q): ApiQuery<AutosaveQuery>,
) -> ApiResult<Json<Draft>> {
  Ok(Json(load_draft(&state, &test_id, &q.user_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_results(
  State(state): State<Arc<AppState>>,
  ApiQuery(q): ApiQuery<ResultsQuery>,
) -> Json<Vec<AttemptResult>> {
  Json(list_results(&state, &q).await)
}

#[instrument(level = "info", skip(state), fields(%attempt_id))]
pub async fn http_get_result(
  State(state): State<Arc<AppState>>,
  Path(attempt_id): Path<String>,
) -> ApiResult<Json<AttemptResult>> {
  Ok(Json(get_result(&state, &attempt_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%attempt_id, writing = body.writing_score, speaking = body.speaking_score))]
pub async fn http_grade_attempt(
  State(state): State<Arc<AppState>>,
  Path(attempt_id): Path<String>,
  ApiJson(body): ApiJson<GradeIn>,
) -> ApiResult<Json<AttemptResult>> {
  let result = grade_attempt(&state, &attempt_id, body.writing_score, body.speaking_score).await?;
  Ok(Json(result))
}

#[instrument(level = "info", skip(state), fields(%attempt_id))]
pub async fn http_delete_result(
  State(state): State<Arc<AppState>>,
  Path(attempt_id): Path<String>,
) -> ApiResult<StatusCode> {
  delete_result(&state, &attempt_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state))]
pub async fn http_export_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let results = state.results.list().await;
  info!(target: "grading", rows = results.len(), "CSV export");
  (
    [
      (header::CONTENT_TYPE, "text/csv".to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{CSV_FILENAME}\"")),
    ],
    results_csv(&results),
  )
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> Json<StatsSummary> {
  Json(summarize(&state.results.list().await))
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title))]
pub async fn http_publish_test(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<PublishTestIn>,
) -> ApiResult<(StatusCode, Json<TestInfo>)> {
  let info = publish_test(&state, body).await?;
  Ok((StatusCode::CREATED, Json(info)))
}

#[instrument(level = "debug", skip(state, body), fields(text_len = body.text.as_str().len()))]
pub async fn http_word_count(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<WordCountIn>,
) -> Json<WordCountCheck> {
  Json(word_count(&state, &body))
}
