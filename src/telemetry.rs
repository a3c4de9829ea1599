//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,grading=debug,ielts_backend=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Scoring events log under the `grading` target, service lifecycle under `ielts_backend`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,grading=debug,ielts_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Unknown or missing values fall back to pretty output.
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let (filter, filter_source) = match EnvFilter::try_from_env("LOG_LEVEL") {
        Ok(f) => (f, "LOG_LEVEL"),
        Err(_) => (EnvFilter::new(DEFAULT_FILTER), "default"),
    };
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    tracing::debug!(target: "ielts_backend", ?format, filter_source, "Tracing initialized");
}
