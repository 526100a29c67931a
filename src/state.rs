//! Application state: quiz sessions, settings resolution, prompts, and the
//! advisory client.
//!
//! This module owns:
//!   - the session store (uuid -> QuizSession)
//!   - the settings resolver (build-time defaults + persisted overrides)
//!   - the prompts struct (from TOML or defaults)
//!   - the advisory HTTP client

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::advisory::AdvisoryClient;
use crate::config::{load_advisor_config_from_env, Prompts};
use crate::deck;
use crate::session::{QuizSession, SessionError};
use crate::settings::{BuildDefaults, JsonFileStore, SettingsResolver};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub advisory: AdvisoryClient,
    pub resolver: Arc<SettingsResolver>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load prompt config, wire the settings tiers,
    /// keep the advisory client ready. Credentials are checked per call, not
    /// here; we only log what the current tiers resolve to.
    #[instrument(level = "info", skip_all)]
    pub fn new(advisory: AdvisoryClient) -> Self {
        let prompts = load_advisor_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let resolver = SettingsResolver::new(
            BuildDefaults::from_build_env(),
            Box::new(JsonFileStore::from_env()),
        );
        let resolved = resolver.resolve();
        if resolved.has_credential() {
            info!(target: "tonedeck_backend", base_url = %resolved.base_url, model = %resolved.model, "Advisory enabled.");
        } else {
            info!(target: "tonedeck_backend", base_url = %resolved.base_url, model = %resolved.model, "Advisory disabled (no API key in any settings tier).");
        }

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            advisory,
            resolver: Arc::new(resolver),
            prompts,
        }
    }

    /// Create a session over a freshly shuffled deck and register it under a
    /// new id. The RNG that shuffled the deck moves into the session for
    /// option sampling.
    #[instrument(level = "info", skip(self))]
    pub async fn start_session(&self) -> Result<String, SessionError> {
        let mut cards = deck::build_deck();
        let mut rng = StdRng::from_entropy();
        deck::shuffle(&mut cards, &mut rng);

        let session = QuizSession::start(cards, rng)?;
        let id = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "quiz", session = %id, "Session started");
        Ok(id)
    }
}
