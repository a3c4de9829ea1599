//! Error kinds reported by the grading core, and their HTTP rendering.
//!
//! Every error is a rejected operation with no side effects; the caller (UI) decides
//! how to surface it.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type GradingResult<T> = Result<T, GradingError>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GradingError {
    #[error("No published answer key for test '{0}'")]
    AnswerKeyNotFound(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Attempt not found: {0}")]
    AttemptNotFound(String),

    #[error("{field} score {value} must be between 0 and 9 in 0.5 steps")]
    InvalidScoreRange { field: &'static str, value: f64 },

    #[error("Test '{0}' already exists; published answer keys are immutable")]
    TestAlreadyExists(String),

    #[error("Invalid answer key: {0}")]
    InvalidAnswerKey(String),

    #[error("No autosaved draft for user '{user_id}' on test '{test_id}'")]
    DraftNotFound { test_id: String, user_id: String },

    #[error("Autosave for test '{0}' carried neither answers nor data")]
    EmptyDraft(String),
}

impl GradingError {
    /// Stable machine-readable kind, sent to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            GradingError::AnswerKeyNotFound(_) => "AnswerKeyNotFound",
            GradingError::TestNotFound(_) => "TestNotFound",
            GradingError::AttemptNotFound(_) => "AttemptNotFound",
            GradingError::InvalidScoreRange { .. } => "InvalidScoreRange",
            GradingError::TestAlreadyExists(_) => "TestAlreadyExists",
            GradingError::InvalidAnswerKey(_) => "InvalidAnswerKey",
            GradingError::DraftNotFound { .. } => "DraftNotFound",
            GradingError::EmptyDraft(_) => "EmptyDraft",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GradingError::AnswerKeyNotFound(_)
            | GradingError::TestNotFound(_)
            | GradingError::AttemptNotFound(_)
            | GradingError::DraftNotFound { .. } => StatusCode::NOT_FOUND,
            GradingError::InvalidScoreRange { .. }
            | GradingError::InvalidAnswerKey(_)
            | GradingError::EmptyDraft(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GradingError::TestAlreadyExists(_) => StatusCode::CONFLICT,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// HTTP-facing error: core failures plus request bodies or query strings that
/// could not be parsed. Both render as `{ "error", "message" }` JSON.
#[derive(Debug)]
pub enum ApiError {
    Grading(GradingError),
    InvalidRequest { status: StatusCode, message: String },
}

impl From<GradingError> for ApiError {
    fn from(err: GradingError) -> Self {
        ApiError::Grading(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Grading(err) => (
                err.status(),
                ErrorBody { error: err.kind(), message: err.to_string() },
            ),
            ApiError::InvalidRequest { status, message } => {
                tracing::warn!(target: "grading", %status, %message, "Request rejected");
                (status, ErrorBody { error: "InvalidRequest", message })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let err = GradingError::AttemptNotFound("attempt-1".into());
        assert_eq!(err.kind(), "AttemptNotFound");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = GradingError::InvalidScoreRange { field: "writing", value: 9.5 };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "writing score 9.5 must be between 0 and 9 in 0.5 steps");

        assert_eq!(GradingError::TestAlreadyExists("demo-1".into()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_renders_status() {
        let resp = ApiError::from(GradingError::AnswerKeyNotFound("nope".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: "bad query".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
