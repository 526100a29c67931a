//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Session lifecycle (start, snapshot, options, answer, advance)
//!   - Advisory calls (free-text advice, mood matching, seasonal analysis)
//!   - Settings read/write over the resolver
//!
//! Handlers stay thin; everything here returns protocol DTOs or a
//! user-facing error message.

use base64::Engine;
use tracing::{debug, error, info, instrument};

use crate::advisory::{AdvisoryError, SeasonalAnalysis};
use crate::protocol::{
  card_out, mood_out, phase_out, settings_out, tone_out, AnswerOut, MoodOut, SessionOut,
  SettingsOut, ToneOut,
};
use crate::session::QuizSession;
use crate::settings::StoredSettings;
use crate::state::AppState;
use crate::util::trunc_for_log;

fn snapshot(id: &str, s: &QuizSession) -> SessionOut {
  SessionOut {
    id: id.to_string(),
    index: s.index(),
    deck_len: s.deck_len(),
    score: s.score(),
    streak: s.streak(),
    best_streak: s.best_streak(),
    history: s.history(),
    phase: phase_out(s.phase()),
    card: card_out(s.current_card()),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn start_session(state: &AppState) -> Result<SessionOut, String> {
  let id = state.start_session().await.map_err(|e| e.to_string())?;
  let sessions = state.sessions.read().await;
  let session = sessions.get(&id).ok_or_else(|| format!("Unknown sessionId: {}", id))?;
  Ok(snapshot(&id, session))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn session_snapshot(state: &AppState, session_id: &str) -> Result<SessionOut, String> {
  let sessions = state.sessions.read().await;
  let session = sessions
    .get(session_id)
    .ok_or_else(|| format!("Unknown sessionId: {}", session_id))?;
  Ok(snapshot(session_id, session))
}

/// Option set for the current card: four distinct tones, the correct one
/// among them. Recomputed on every call.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn card_options(state: &AppState, session_id: &str) -> Result<Vec<ToneOut>, String> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| format!("Unknown sessionId: {}", session_id))?;
  Ok(session.options().iter().map(tone_out).collect())
}

#[instrument(level = "info", skip(state), fields(%session_id, %tone_id))]
pub async fn submit_answer(
  state: &AppState,
  session_id: &str,
  tone_id: &str,
) -> Result<AnswerOut, String> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| format!("Unknown sessionId: {}", session_id))?;

  let correct = session.submit_answer(tone_id).map_err(|e| e.to_string())?;
  info!(target: "quiz", session = %session_id, %tone_id, %correct, score = session.score(), streak = session.streak(), "Answer graded");
  Ok(AnswerOut {
    correct,
    correct_tone_id: session.current_card().tone_id.to_string(),
    score: session.score(),
    streak: session.streak(),
    best_streak: session.best_streak(),
    history: session.history(),
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn advance(state: &AppState, session_id: &str) -> Result<SessionOut, String> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| format!("Unknown sessionId: {}", session_id))?;
  let index = session.advance().map_err(|e| e.to_string())?;
  debug!(target: "quiz", session = %session_id, %index, "Advanced to next card");
  Ok(snapshot(session_id, session))
}

// -------- Advisory paths --------

/// Map the advisory taxonomy to what the user should see. Details are
/// logged; malformed payloads come back as one generic message.
fn advisory_user_message(e: &AdvisoryError) -> String {
  match e {
    AdvisoryError::Configuration => {
      "No API key configured. Add one in settings before using the advisor.".into()
    }
    AdvisoryError::Transport(_) => e.to_string(),
    AdvisoryError::MalformedResponse(_) => "Could not interpret the advisory response.".into(),
  }
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn do_advise(state: &AppState, text: &str) -> Result<String, String> {
  let settings = state.resolver.resolve();
  match state.advisory.advise(&settings, &state.prompts, text).await {
    Ok(t) => Ok(t),
    Err(e) => {
      error!(target: "advisor", error = %e, "Advice call failed");
      Err(advisory_user_message(&e))
    }
  }
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn do_mood_match(state: &AppState, text: &str) -> Result<MoodOut, String> {
  let settings = state.resolver.resolve();
  match state.advisory.mood_match(&settings, &state.prompts, text).await {
    Ok(m) => {
      info!(target: "advisor", tone = %m.tone.id, mood = %trunc_for_log(text, 60), "Mood matched");
      Ok(mood_out(&m))
    }
    Err(e) => {
      error!(target: "advisor", error = %e, "Mood matching failed");
      Err(advisory_user_message(&e))
    }
  }
}

#[instrument(level = "info", skip(state, image_base64), fields(%mime, image_len = image_base64.len()))]
pub async fn do_seasonal(
  state: &AppState,
  image_base64: &str,
  mime: &str,
) -> Result<SeasonalAnalysis, String> {
  // Reject an unreadable payload before any network I/O.
  let bytes = base64::engine::general_purpose::STANDARD
    .decode(image_base64)
    .map_err(|_| "Image payload is not valid base64.".to_string())?;
  debug!(target: "advisor", image_bytes = bytes.len(), "Seasonal image decoded");

  let settings = state.resolver.resolve();
  match state
    .advisory
    .seasonal_analysis(&settings, &state.prompts, image_base64, mime)
    .await
  {
    Ok(a) => {
      info!(target: "advisor", season = %a.season, confidence = %a.confidence, "Seasonal analysis done");
      Ok(a)
    }
    Err(e) => {
      error!(target: "advisor", error = %e, "Seasonal analysis failed");
      Err(advisory_user_message(&e))
    }
  }
}

// -------- Settings --------

pub async fn get_settings(state: &AppState) -> SettingsOut {
  settings_out(&state.resolver.resolve())
}

#[instrument(level = "info", skip_all)]
pub async fn save_settings(
  state: &AppState,
  overrides: StoredSettings,
) -> Result<SettingsOut, String> {
  state
    .resolver
    .save_override(&overrides)
    .map_err(|e| format!("Could not persist settings: {}", e))?;
  Ok(settings_out(&state.resolver.resolve()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::advisory::AdvisoryClient;
  use crate::session::HISTORY_WINDOW;

  fn test_state() -> AppState {
    AppState::new(AdvisoryClient::new().unwrap())
  }

  #[tokio::test]
  async fn session_round_trip_over_state() {
    let state = test_state();
    let s = start_session(&state).await.unwrap();
    assert_eq!(s.deck_len, 144);
    assert_eq!(s.index, 0);
    assert_eq!(s.score, 0);

    let options = card_options(&state, &s.id).await.unwrap();
    assert_eq!(options.len(), 4);
    let correct_id = s.card.tone_id.clone();
    assert_eq!(options.iter().filter(|t| t.id == correct_id).count(), 1);

    let graded = submit_answer(&state, &s.id, &correct_id).await.unwrap();
    assert!(graded.correct);
    assert_eq!(graded.score, 10);
    assert_eq!(graded.streak, 1);

    let next = advance(&state, &s.id).await.unwrap();
    assert_eq!(next.index, 1);
    assert!(next.history.len() <= HISTORY_WINDOW);
  }

  #[tokio::test]
  async fn unknown_session_is_an_error_message() {
    let state = test_state();
    let err = session_snapshot(&state, "nope").await.unwrap_err();
    assert!(err.contains("Unknown sessionId"));
  }

  #[tokio::test]
  async fn misordered_advance_surfaces_the_transition_error() {
    let state = test_state();
    let s = start_session(&state).await.unwrap();
    let err = advance(&state, &s.id).await.unwrap_err();
    assert!(err.contains("not valid"));
  }

  #[tokio::test]
  async fn seasonal_rejects_bad_base64_before_any_call() {
    let state = test_state();
    let err = do_seasonal(&state, "%%%not-base64%%%", "image/jpeg").await.unwrap_err();
    assert!(err.contains("base64"));
  }
}
