//! Router assembly: HTTP endpoints, static front end, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - learner API under `/api/tests/...` and `/api/results/...`
/// - admin API under `/api/admin/...`
/// - the built front end from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/api/health", get(http::http_health))
        // Tests and learner flow
        .route("/api/tests", get(http::http_list_tests))
        .route("/api/tests/:id", get(http::http_get_test))
        .route("/api/tests/:id/submit", post(http::http_submit_test))
        .route(
            "/api/tests/:id/autosave",
            post(http::http_post_autosave).get(http::http_get_autosave),
        )
        .route("/api/answer-keys/:id", get(http::http_get_answer_key))
        .route("/api/writing/word-count", post(http::http_word_count))
        // Results
        .route("/api/results", get(http::http_list_results))
        .route("/api/results/:attempt_id", get(http::http_get_result))
        // Admin
        .route("/api/admin/grade/:attempt_id", post(http::http_grade_attempt))
        .route("/api/admin/results/:attempt_id", delete(http::http_delete_result))
        .route("/api/admin/tests", post(http::http_publish_test))
        .route("/api/admin/export", get(http::http_export_csv))
        .route("/api/admin/stats", get(http::http_stats))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
