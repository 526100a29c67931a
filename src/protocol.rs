//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::advisory::{MoodMatch, SeasonalAnalysis};
use crate::domain::{ColorEntry, Hue, Tone};
use crate::session::Phase;
use crate::settings::Settings;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession,
    SessionState {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    CardOptions {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SubmitAnswer {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "toneId")]
        tone_id: String,
    },
    Advance {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    AdvisorMessage {
        text: String,
    },
    MoodMatch {
        text: String,
    },
    SeasonalAnalysis {
        #[serde(rename = "imageBase64")]
        image_base64: String,
        mime: String,
    },
    GetSettings,
    SaveSettings {
        #[serde(rename = "baseUrl")]
        base_url: Option<String>,
        #[serde(rename = "apiKey")]
        api_key: Option<String>,
        model: Option<String>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    Options {
        options: Vec<ToneOut>,
    },
    AnswerResult {
        result: AnswerOut,
    },
    AdvisorReply {
        text: String,
    },
    MoodMatch {
        verdict: MoodOut,
    },
    SeasonalAnalysis {
        analysis: SeasonalAnalysis,
    },
    Settings {
        settings: SettingsOut,
    },
    Error {
        message: String,
    },
}

/// Session phase as a tagged variant, mirroring the domain state machine.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PhaseOut {
    AwaitingAnswer,
    ShowingResult { correct: bool },
}

/// DTO used by both WS and HTTP for session delivery.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub id: String,
    pub index: usize,
    pub deck_len: usize,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Last five outcomes, oldest first.
    pub history: Vec<bool>,
    pub phase: PhaseOut,
    pub card: CardOut,
}

/// One swatch as delivered to clients. Carries its tone like the study grid
/// does; the quiz UI reveals it only after an answer.
#[derive(Debug, Serialize)]
pub struct CardOut {
    pub id: String,
    pub tone_id: String,
    pub hue_id: u8,
    pub tone_name: String,
    pub hue_name: String,
    pub description: String,
    pub hue_deg: u16,
    pub saturation: u8,
    pub lightness: u8,
    pub css: String,
}

#[derive(Debug, Serialize)]
pub struct ToneOut {
    pub id: String,
    pub name: String,
    pub saturation: u8,
    pub lightness: u8,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct HueOut {
    pub id: u8,
    pub name: String,
    pub angle: u16,
}

pub fn card_out(entry: &ColorEntry) -> CardOut {
    CardOut {
        id: entry.id.clone(),
        tone_id: entry.tone_id.to_string(),
        hue_id: entry.hue_id,
        tone_name: entry.tone_name.to_string(),
        hue_name: entry.hue_name.to_string(),
        description: entry.description.to_string(),
        hue_deg: entry.hue_deg,
        saturation: entry.saturation,
        lightness: entry.lightness,
        css: entry.css(),
    }
}

pub fn tone_out(tone: &Tone) -> ToneOut {
    ToneOut {
        id: tone.id.to_string(),
        name: tone.name.to_string(),
        saturation: tone.saturation,
        lightness: tone.lightness,
        description: tone.description.to_string(),
    }
}

pub fn hue_out(hue: &Hue) -> HueOut {
    HueOut { id: hue.id, name: hue.name.to_string(), angle: hue.angle }
}

pub fn phase_out(phase: Phase) -> PhaseOut {
    match phase {
        Phase::AwaitingAnswer => PhaseOut::AwaitingAnswer,
        Phase::ShowingResult { correct } => PhaseOut::ShowingResult { correct },
    }
}

pub fn mood_out(m: &MoodMatch) -> MoodOut {
    MoodOut { tone: tone_out(&m.tone), reasoning: m.reasoning.clone() }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct CatalogOut {
    pub tones: Vec<ToneOut>,
    pub hues: Vec<HueOut>,
}

#[derive(Serialize)]
pub struct DeckOut {
    pub cards: Vec<CardOut>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "toneId")]
    pub tone_id: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub correct_tone_id: String,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub history: Vec<bool>,
}

#[derive(Serialize)]
pub struct OptionsOut {
    pub options: Vec<ToneOut>,
}

#[derive(Deserialize)]
pub struct AdvisorIn {
    pub text: String,
}
#[derive(Serialize)]
pub struct AdvisorOut {
    pub text: String,
}

#[derive(Deserialize)]
pub struct MoodIn {
    pub text: String,
}
#[derive(Debug, Serialize)]
pub struct MoodOut {
    pub tone: ToneOut,
    pub reasoning: String,
}

#[derive(Deserialize)]
pub struct SeasonalIn {
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    pub mime: String,
}

/// Settings as reported to clients. The credential itself never travels
/// back out; only whether one is configured.
#[derive(Debug, Serialize)]
pub struct SettingsOut {
    pub base_url: String,
    pub model: String,
    pub api_key_set: bool,
}

pub fn settings_out(s: &Settings) -> SettingsOut {
    SettingsOut {
        base_url: s.base_url.clone(),
        model: s.model.clone(),
        api_key_set: s.has_credential(),
    }
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
