//! IELTS Mock Test · Scoring Backend
//!
//! - Axum HTTP API for the computer-delivered mock test front end
//! - Auto-grading of listening/reading, band conversion, examiner grading workflow
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   IELTS_CONFIG_PATH : path to TOML config (extra tests + answer keys, writing thresholds)
//!   STATIC_DIR        : built front end directory (default "./static")
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod catalog;
mod config;
mod domain;
mod error;
mod export;
mod logic;
mod protocol;
mod routes;
mod scoring;
mod seeds;
mod state;
mod stats;
mod store;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // In-memory result store, demo test plus any configured tests.
  let state = Arc::new(AppState::new());

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state, &static_dir);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "ielts_backend", %addr, %static_dir, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "ielts_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "ielts_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
