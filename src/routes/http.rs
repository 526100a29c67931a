//! HTTP endpoint handlers. Thin wrappers that forward to core logic.
//! Each handler is instrumented; logs include parameters and basic result
//! info. Errors come back as `{ "message": ... }` with a 4xx status.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{info, instrument};

use crate::catalog::{HUES, TONES};
use crate::deck::build_deck;
use crate::logic::*;
use crate::protocol::*;
use crate::settings::StoredSettings;
use crate::state::AppState;

fn reply<T: Serialize>(result: Result<T, String>) -> axum::response::Response {
  match result {
    Ok(dto) => Json(dto).into_response(),
    Err(message) => (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response(),
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_get_catalog() -> impl IntoResponse {
  Json(CatalogOut {
    tones: TONES.iter().map(tone_out).collect(),
    hues: HUES.iter().map(hue_out).collect(),
  })
}

/// The canonical (unshuffled) 144-card study deck, for the swatch grid.
#[instrument(level = "info")]
pub async fn http_get_deck() -> impl IntoResponse {
  let cards = build_deck().iter().map(card_out).collect();
  Json(DeckOut { cards })
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let result = start_session(&state).await;
  if let Ok(s) = &result {
    info!(target: "quiz", session = %s.id, "HTTP session started");
  }
  reply(result)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  reply(session_snapshot(&state, &id).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_options(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  reply(card_options(&state, &id).await.map(|options| OptionsOut { options }))
}

#[instrument(level = "info", skip(state, body), fields(%id, tone_id = %body.tone_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  let result = submit_answer(&state, &id, &body.tone_id).await;
  if let Ok(r) = &result {
    info!(target: "quiz", session = %id, correct = %r.correct, score = r.score, "HTTP answer graded");
  }
  reply(result)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_advance(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  reply(advance(&state, &id).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_advisor_ask(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AdvisorIn>,
) -> impl IntoResponse {
  reply(do_advise(&state, &body.text).await.map(|text| AdvisorOut { text }))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_mood(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MoodIn>,
) -> impl IntoResponse {
  reply(do_mood_match(&state, &body.text).await)
}

#[instrument(level = "info", skip(state, body), fields(mime = %body.mime, image_len = body.image_base64.len()))]
pub async fn http_post_seasonal(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SeasonalIn>,
) -> impl IntoResponse {
  reply(do_seasonal(&state, &body.image_base64, &body.mime).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_settings(&state).await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_settings(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StoredSettings>,
) -> impl IntoResponse {
  reply(save_settings(&state, body).await)
}
