//! Tonedeck · Color Taxonomy Trainer Backend
//!
//! - Axum HTTP + WebSocket API
//! - 12-tone x 12-hue swatch catalog, flashcard quiz sessions
//! - Optional LLM advisory (mood matching, seasonal analysis, free advice)
//! - Static SPA fallback (./static/index.html)
//!
//! Runtime env variables:
//!   PORT                : u16 (default 3000)
//!   ADVISOR_CONFIG_PATH : path to TOML config (prompt overrides)
//!   SETTINGS_PATH       : persisted settings file (default ./settings.json)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"
//!
//! Build-time env variables (baked in with `option_env!`):
//!   TONEDECK_API_KEY    : default advisory credential
//!   TONEDECK_BASE_URL   : default endpoint, falls back to api.openai.com
//!   TONEDECK_MODEL      : default model, falls back to gpt-4o-mini

mod telemetry;
mod util;
mod domain;
mod catalog;
mod color;
mod deck;
mod session;
mod settings;
mod config;
mod advisory;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::advisory::AdvisoryClient;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (session store, settings tiers, advisory client).
  let advisory = AdvisoryClient::new()?;
  let state = Arc::new(AppState::new(advisory));

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "tonedeck_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
