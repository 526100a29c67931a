//! Minimal OpenAI-compatible client for the advisory features.
//!
//! We only call chat completions and request either plain text or a strict
//! JSON object. Calls are instrumented and log model names, latencies, and
//! response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::catalog::{self, TONES};
use crate::config::Prompts;
use crate::domain::Tone;
use crate::settings::Settings;
use crate::util::fill_template;

/// Required arity of the seasonal palette and avoid lists.
pub const PALETTE_LEN: usize = 6;
pub const AVOID_LEN: usize = 3;

/// Failure taxonomy at the advisory boundary. Nothing here is retried; each
/// variant surfaces to the caller as-is.
#[derive(Debug, Error)]
pub enum AdvisoryError {
  /// No credential resolved before the call was attempted.
  #[error("no API key configured")]
  Configuration,
  /// Network-layer failure or a non-success HTTP status.
  #[error("advisory endpoint error: {0}")]
  Transport(String),
  /// The call succeeded but the payload does not fit the expected shape.
  #[error("could not interpret the advisory response: {0}")]
  MalformedResponse(String),
}

#[derive(Clone)]
pub struct AdvisoryClient {
  client: reqwest::Client,
}

/// Mood-matching verdict: one catalog tone plus the model's reasoning.
#[derive(Clone, Debug, Serialize)]
pub struct MoodMatch {
  pub tone: Tone,
  pub reasoning: String,
}

/// Seasonal photo analysis, exactly as the model returns it (shape-checked).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeasonalAnalysis {
  pub season: String,
  pub confidence: String,
  pub reasoning: String,
  #[serde(default)]
  pub characteristics: Vec<String>,
  pub palette: Vec<PaletteEntry>,
  pub avoid: Vec<PaletteEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaletteEntry {
  pub name: String,
  pub hex: String,
  pub rationale: String,
}

impl AdvisoryClient {
  pub fn new() -> Result<Self, AdvisoryError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| AdvisoryError::Transport(e.to_string()))?;
    Ok(Self { client })
  }

  /// One chat-completions round trip. Settings are resolved by the caller
  /// per invocation; nothing is cached here.
  #[instrument(level = "info", skip_all, fields(model = %settings.model))]
  async fn chat(
    &self,
    settings: &Settings,
    req: &ChatCompletionRequest,
  ) -> Result<String, AdvisoryError> {
    if !settings.has_credential() {
      return Err(AdvisoryError::Configuration);
    }

    let url = chat_url(&settings.base_url);
    let res = self.client.post(&url)
      .header(USER_AGENT, "tonedeck-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", settings.api_key))
      .json(req).send().await.map_err(|e| AdvisoryError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(AdvisoryError::Transport(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Advisory usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Free-text color advice.
  #[instrument(level = "info", skip(self, settings, prompts, question), fields(question_len = question.len()))]
  pub async fn advise(
    &self,
    settings: &Settings,
    prompts: &Prompts,
    question: &str,
  ) -> Result<String, AdvisoryError> {
    let req = text_request(&settings.model, &prompts.advise_system, question, 0.4, false);
    self.chat(settings, &req).await
  }

  /// Match a mood description to one catalog tone via strict JSON.
  #[instrument(level = "info", skip(self, settings, prompts, mood), fields(mood_len = mood.len()))]
  pub async fn mood_match(
    &self,
    settings: &Settings,
    prompts: &Prompts,
    mood: &str,
  ) -> Result<MoodMatch, AdvisoryError> {
    let user = fill_template(
      &prompts.mood_user_template,
      &[("mood", mood), ("catalog", &tone_catalog_lines())],
    );
    let req = text_request(&settings.model, &prompts.mood_system, &user, 0.2, true);

    let start = std::time::Instant::now();
    let raw = self.chat(settings, &req).await;
    let elapsed = start.elapsed();
    match &raw {
      Ok(_) => info!(?elapsed, "Mood verdict received"),
      Err(e) => error!(?elapsed, error = %e, "Mood matching call failed"),
    }

    parse_mood(&raw?)
  }

  /// Seasonal color analysis of a photo. The image travels inline as a
  /// base64 data URL; the caller has already validated the encoding.
  #[instrument(level = "info", skip(self, settings, prompts, image_base64), fields(%mime, image_len = image_base64.len()))]
  pub async fn seasonal_analysis(
    &self,
    settings: &Settings,
    prompts: &Prompts,
    image_base64: &str,
    mime: &str,
  ) -> Result<SeasonalAnalysis, AdvisoryError> {
    let data_url = format!("data:{};base64,{}", mime, image_base64);
    let req = vision_request(
      &settings.model,
      &prompts.seasonal_system,
      &prompts.seasonal_user,
      &data_url,
    );

    let start = std::time::Instant::now();
    let raw = self.chat(settings, &req).await;
    let elapsed = start.elapsed();
    match &raw {
      Ok(_) => info!(?elapsed, "Seasonal analysis received"),
      Err(e) => error!(?elapsed, error = %e, "Seasonal analysis call failed"),
    }

    parse_seasonal(&raw?)
  }
}

/// `{base}/chat/completions`, or `base` verbatim if it already names the
/// path (some gateways hand out the full endpoint).
fn chat_url(base: &str) -> String {
  if base.contains("chat/completions") {
    base.to_string()
  } else {
    format!("{}/chat/completions", base.trim_end_matches('/'))
  }
}

fn tone_catalog_lines() -> String {
  TONES
    .iter()
    .map(|t| format!("{}: {} - {}", t.id, t.name, t.description))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Parse the strict `{id, reasoning}` mood verdict. An identifier outside
/// the tone catalog counts as a malformed response, not a distinct
/// condition.
fn parse_mood(raw: &str) -> Result<MoodMatch, AdvisoryError> {
  #[derive(Deserialize)]
  struct Verdict {
    id: String,
    reasoning: String,
  }

  let v: Verdict = serde_json::from_str(raw)
    .map_err(|e| AdvisoryError::MalformedResponse(format!("invalid JSON: {}", e)))?;
  let tone = catalog::tone_by_id(v.id.trim()).ok_or_else(|| {
    AdvisoryError::MalformedResponse(format!("unknown tone identifier '{}'", v.id))
  })?;
  Ok(MoodMatch { tone: *tone, reasoning: v.reasoning })
}

/// Parse and shape-check the seasonal analysis payload.
fn parse_seasonal(raw: &str) -> Result<SeasonalAnalysis, AdvisoryError> {
  let analysis: SeasonalAnalysis = serde_json::from_str(raw)
    .map_err(|e| AdvisoryError::MalformedResponse(format!("invalid JSON: {}", e)))?;
  if analysis.palette.len() != PALETTE_LEN {
    return Err(AdvisoryError::MalformedResponse(format!(
      "expected {} palette entries, got {}",
      PALETTE_LEN,
      analysis.palette.len()
    )));
  }
  if analysis.avoid.len() != AVOID_LEN {
    return Err(AdvisoryError::MalformedResponse(format!(
      "expected {} avoid entries, got {}",
      AVOID_LEN,
      analysis.avoid.len()
    )));
  }
  Ok(analysis)
}

fn text_request(
  model: &str,
  system: &str,
  user: &str,
  temperature: f32,
  json_object: bool,
) -> ChatCompletionRequest {
  ChatCompletionRequest {
    model: model.to_string(),
    messages: vec![
      ChatMessageReq { role: "system".into(), content: MessageContent::Text(system.into()) },
      ChatMessageReq { role: "user".into(), content: MessageContent::Text(user.into()) },
    ],
    temperature,
    response_format: json_object.then(|| ResponseFormat { r#type: "json_object".into() }),
  }
}

fn vision_request(
  model: &str,
  system: &str,
  user: &str,
  image_data_url: &str,
) -> ChatCompletionRequest {
  ChatCompletionRequest {
    model: model.to_string(),
    messages: vec![
      ChatMessageReq { role: "system".into(), content: MessageContent::Text(system.into()) },
      ChatMessageReq {
        role: "user".into(),
        content: MessageContent::Parts(vec![
          ContentPart::Text { text: user.into() },
          ContentPart::ImageUrl { image_url: ImageUrl { url: image_data_url.into() } },
        ]),
      },
    ],
    temperature: 0.2,
    response_format: Some(ResponseFormat { r#type: "json_object".into() }),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: MessageContent }
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
  Text(String),
  Parts(Vec<ContentPart>),
}
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
  Text { text: String },
  ImageUrl { image_url: ImageUrl },
}
#[derive(Serialize)]
struct ImageUrl { url: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chat_url_appends_or_passes_through() {
    assert_eq!(
      chat_url("https://api.openai.com/v1"),
      "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
      chat_url("https://api.openai.com/v1/"),
      "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
      chat_url("https://gw.example/openai/chat/completions"),
      "https://gw.example/openai/chat/completions"
    );
  }

  #[test]
  fn mood_parse_accepts_catalog_tones() {
    let m = parse_mood(r#"{"id": "dp", "reasoning": "somber and rich"}"#).unwrap();
    assert_eq!(m.tone.id, "dp");
    assert_eq!(m.reasoning, "somber and rich");
  }

  #[test]
  fn mood_parse_rejects_unknown_tone_as_malformed() {
    let err = parse_mood(r#"{"id": "neon", "reasoning": "?"}"#).unwrap_err();
    assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
  }

  #[test]
  fn mood_parse_rejects_invalid_json() {
    let err = parse_mood("the tone is probably vivid").unwrap_err();
    assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
  }

  fn seasonal_json(palette: usize, avoid: usize) -> String {
    let entry = r##"{"name": "Moss", "hex": "#4a5d3a", "rationale": "echoes the undertone"}"##;
    let list = |n: usize| -> String {
      std::iter::repeat(entry).take(n).collect::<Vec<_>>().join(",")
    };
    format!(
      r#"{{"season": "Deep Autumn", "confidence": "high", "reasoning": "warm undertone",
           "characteristics": ["warm", "muted"],
           "palette": [{}], "avoid": [{}]}}"#,
      list(palette),
      list(avoid)
    )
  }

  #[test]
  fn seasonal_parse_accepts_the_exact_shape() {
    let a = parse_seasonal(&seasonal_json(6, 3)).unwrap();
    assert_eq!(a.season, "Deep Autumn");
    assert_eq!(a.palette.len(), 6);
    assert_eq!(a.avoid.len(), 3);
    assert_eq!(a.palette[0].hex, "#4a5d3a");
  }

  #[test]
  fn seasonal_parse_rejects_wrong_arity() {
    assert!(matches!(
      parse_seasonal(&seasonal_json(5, 3)),
      Err(AdvisoryError::MalformedResponse(_))
    ));
    assert!(matches!(
      parse_seasonal(&seasonal_json(6, 4)),
      Err(AdvisoryError::MalformedResponse(_))
    ));
  }

  #[test]
  fn seasonal_parse_rejects_invalid_json() {
    assert!(matches!(
      parse_seasonal("not json"),
      Err(AdvisoryError::MalformedResponse(_))
    ));
  }

  #[test]
  fn api_error_extraction() {
    let body = r#"{"error": {"message": "Incorrect API key provided"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_api_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn catalog_lines_cover_all_twelve_tones() {
    let lines = tone_catalog_lines();
    assert_eq!(lines.lines().count(), 12);
    assert!(lines.contains("dkg: Dark Grayish"));
  }
}
