//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to core logic. We reply with a single JSON message per
//! request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::settings::StoredSettings;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "tonedeck_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "tonedeck_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "tonedeck_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "tonedeck_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "tonedeck_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession => match start_session(state).await {
      Ok(session) => {
        tracing::info!(target: "quiz", session = %session.id, "WS session started");
        ServerWsMessage::Session { session }
      }
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::SessionState { session_id } => {
      match session_snapshot(state, &session_id).await {
        Ok(session) => ServerWsMessage::Session { session },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::CardOptions { session_id } => {
      match card_options(state, &session_id).await {
        Ok(options) => ServerWsMessage::Options { options },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::SubmitAnswer { session_id, tone_id } => {
      match submit_answer(state, &session_id, &tone_id).await {
        Ok(result) => {
          tracing::info!(target: "quiz", session = %session_id, correct = %result.correct, "WS answer graded");
          ServerWsMessage::AnswerResult { result }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Advance { session_id } => match advance(state, &session_id).await {
      Ok(session) => ServerWsMessage::Session { session },
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::AdvisorMessage { text } => match do_advise(state, &text).await {
      Ok(text) => ServerWsMessage::AdvisorReply { text },
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::MoodMatch { text } => match do_mood_match(state, &text).await {
      Ok(verdict) => ServerWsMessage::MoodMatch { verdict },
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::SeasonalAnalysis { image_base64, mime } => {
      match do_seasonal(state, &image_base64, &mime).await {
        Ok(analysis) => ServerWsMessage::SeasonalAnalysis { analysis },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::GetSettings => ServerWsMessage::Settings { settings: get_settings(state).await },

    ClientWsMessage::SaveSettings { base_url, api_key, model } => {
      let overrides = StoredSettings { base_url, api_key, model };
      match save_settings(state, overrides).await {
        Ok(settings) => ServerWsMessage::Settings { settings },
        Err(message) => ServerWsMessage::Error { message },
      }
    }
  }
}
