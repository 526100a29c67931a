//! Loading advisor configuration (prompts) from TOML.
//!
//! See `AdvisorConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AdvisorConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts used by the advisory client. Defaults are sensible for color
/// guidance; override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Free-text advice
  pub advise_system: String,
  // Mood-to-tone matching (strict JSON)
  pub mood_system: String,
  pub mood_user_template: String,
  // Seasonal photo analysis (strict JSON)
  pub seasonal_system: String,
  pub seasonal_user: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      advise_system: "You are a color consultant for a twelve-tone, twelve-hue color taxonomy. Answer questions about color choice, combination and perception in 2-3 concise sentences.".into(),
      mood_system: "You match a mood description to ONE tone from a fixed catalog. Respond ONLY with strict JSON.".into(),
      mood_user_template: "Mood: {mood}\nTone catalog (id: name - description):\n{catalog}\nReturn JSON {\"id\": <one catalog tone id>, \"reasoning\": <short string>}.".into(),
      seasonal_system: "You are a seasonal color analyst. Respond ONLY with strict JSON.".into(),
      seasonal_user: "Analyze the person in this photo for seasonal color type. Return JSON with keys: season (string), confidence (string), reasoning (string), characteristics (array of strings), palette (EXACTLY 6 entries), avoid (EXACTLY 3 entries). Each palette/avoid entry is {\"name\": string, \"hex\": string, \"rationale\": string}.".into(),
    }
  }
}

/// Attempt to load `AdvisorConfig` from ADVISOR_CONFIG_PATH. On any
/// parsing/IO error, returns None and the built-in defaults apply.
pub fn load_advisor_config_from_env() -> Option<AdvisorConfig> {
  let path = std::env::var("ADVISOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AdvisorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "tonedeck_backend", %path, "Loaded advisor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "tonedeck_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "tonedeck_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
