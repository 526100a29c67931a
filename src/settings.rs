//! Effective advisory settings: three-tier, per-field precedence.
//!
//! Order: persisted override > build-time default > hard-coded fallback.
//! Blank strings count as absent (not as an explicit "use nothing"), and
//! resolution is per field, so a stored record with only `model` set still
//! takes the lower tiers for the other fields. The store is re-read on every
//! `resolve`; nothing is cached here.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Storage key for the persisted override blob. Fixed per application
/// instance.
pub const SETTINGS_KEY: &str = "advisor_settings";

/// Last-resort endpoint and model. The credential has no non-empty fallback;
/// an empty resolved key means "no credential configured".
pub const FALLBACK_BASE_URL: &str = "https://api.openai.com/v1";
pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

// Build-time tier, injected with `option_env!` when the binary is compiled.
const BUILD_API_KEY: Option<&str> = option_env!("TONEDECK_API_KEY");
const BUILD_BASE_URL: Option<&str> = option_env!("TONEDECK_BASE_URL");
const BUILD_MODEL: Option<&str> = option_env!("TONEDECK_MODEL");

/// Minimal key/value storage capability backing the persisted-override tier.
/// The resolver depends only on this interface, not on a storage technology.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// In-memory store for tests and ephemeral deployments.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self
            .map
            .write()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "settings store lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one JSON object per file, each key holding an opaque
/// string blob. Good enough for a single-instance deployment.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `SETTINGS_PATH`, defaulting to `./settings.json`.
    pub fn from_env() -> Self {
        let path = std::env::var("SETTINGS_PATH").unwrap_or_else(|_| "./settings.json".into());
        info!(target: "tonedeck_backend", %path, "Settings store");
        Self::new(path)
    }

    fn read_map(&self) -> HashMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(target: "tonedeck_backend", path = %self.path.display(), error = %e, "Settings file unreadable; treating as empty");
                HashMap::new()
            }
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        let blob = serde_json::to_string_pretty(&map)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(&self.path, blob)
    }
}

/// The persisted override record. Absent or blank fields fall through to the
/// lower tiers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSettings {
    #[serde(default, rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Fully resolved configuration consumed by the advisory client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Settings {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// The build-time tier as data, so resolution stays a pure function of its
/// two inputs and tests can supply their own values.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildDefaults {
    pub base_url: Option<&'static str>,
    pub api_key: Option<&'static str>,
    pub model: Option<&'static str>,
}

impl BuildDefaults {
    pub fn from_build_env() -> Self {
        Self {
            base_url: BUILD_BASE_URL,
            api_key: BUILD_API_KEY,
            model: BUILD_MODEL,
        }
    }
}

pub struct SettingsResolver {
    build: BuildDefaults,
    store: Box<dyn KvStore>,
}

impl SettingsResolver {
    pub fn new(build: BuildDefaults, store: Box<dyn KvStore>) -> Self {
        Self { build, store }
    }

    /// The persisted override record as currently stored (empty when absent
    /// or unparseable).
    pub fn stored(&self) -> StoredSettings {
        self.store
            .get(SETTINGS_KEY)
            .and_then(|blob| serde_json::from_str(&blob).ok())
            .unwrap_or_default()
    }

    /// Persist the override record as an opaque JSON blob.
    #[instrument(level = "info", skip_all)]
    pub fn save_override(&self, overrides: &StoredSettings) -> io::Result<()> {
        let blob = serde_json::to_string(overrides)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.store.set(SETTINGS_KEY, &blob)?;
        info!(target: "tonedeck_backend", "Settings override saved");
        Ok(())
    }

    /// Resolve the effective settings, per field, reading the store fresh.
    pub fn resolve(&self) -> Settings {
        let stored = self.stored();
        Settings {
            base_url: pick(stored.base_url.as_deref(), self.build.base_url, FALLBACK_BASE_URL),
            api_key: pick(stored.api_key.as_deref(), self.build.api_key, ""),
            model: pick(stored.model.as_deref(), self.build.model, FALLBACK_MODEL),
        }
    }
}

fn pick(stored: Option<&str>, build: Option<&str>, fallback: &str) -> String {
    non_blank(stored)
        .or_else(|| non_blank(build))
        .unwrap_or(fallback)
        .trim()
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(build: BuildDefaults, store: MemoryStore) -> SettingsResolver {
        SettingsResolver::new(build, Box::new(store))
    }

    #[test]
    fn all_tiers_absent_yields_fallbacks_and_empty_key() {
        let r = resolver(BuildDefaults::default(), MemoryStore::default());
        let s = r.resolve();
        assert_eq!(s.base_url, FALLBACK_BASE_URL);
        assert_eq!(s.model, FALLBACK_MODEL);
        assert_eq!(s.api_key, "");
        assert!(!s.has_credential());
    }

    #[test]
    fn build_tier_beats_fallback() {
        let build = BuildDefaults {
            base_url: Some("https://llm.example/v1"),
            api_key: Some("sk-build"),
            model: Some("gpt-4o"),
        };
        let s = resolver(build, MemoryStore::default()).resolve();
        assert_eq!(s.base_url, "https://llm.example/v1");
        assert_eq!(s.api_key, "sk-build");
        assert_eq!(s.model, "gpt-4o");
    }

    #[test]
    fn blank_override_falls_through_to_build_tier() {
        let build = BuildDefaults { model: Some("gpt-4o"), ..Default::default() };
        let r = resolver(build, MemoryStore::default());
        r.save_override(&StoredSettings { model: Some("".into()), ..Default::default() })
            .unwrap();
        assert_eq!(r.resolve().model, "gpt-4o");
    }

    #[test]
    fn stored_override_wins_regardless_of_lower_tiers() {
        let build = BuildDefaults { model: Some("gpt-4o"), ..Default::default() };
        let r = resolver(build, MemoryStore::default());
        r.save_override(&StoredSettings { model: Some("gpt-4o-mini".into()), ..Default::default() })
            .unwrap();
        assert_eq!(r.resolve().model, "gpt-4o-mini");
    }

    #[test]
    fn precedence_is_per_field_not_per_record() {
        let build = BuildDefaults {
            base_url: Some("https://llm.example/v1"),
            api_key: Some("sk-build"),
            model: Some("gpt-4o"),
        };
        let r = resolver(build, MemoryStore::default());
        r.save_override(&StoredSettings { model: Some("local-mix".into()), ..Default::default() })
            .unwrap();
        let s = r.resolve();
        assert_eq!(s.model, "local-mix");
        assert_eq!(s.base_url, "https://llm.example/v1");
        assert_eq!(s.api_key, "sk-build");
    }

    #[test]
    fn resolve_reads_the_store_fresh_each_call() {
        let r = resolver(BuildDefaults::default(), MemoryStore::default());
        assert_eq!(r.resolve().model, FALLBACK_MODEL);
        r.save_override(&StoredSettings { model: Some("swapped".into()), ..Default::default() })
            .unwrap();
        assert_eq!(r.resolve().model, "swapped");
    }

    #[test]
    fn file_store_round_trips_the_blob() {
        let dir = std::env::temp_dir().join(format!("tonedeck-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        let store = JsonFileStore::new(&path);

        assert_eq!(store.get(SETTINGS_KEY), None);
        store.set(SETTINGS_KEY, r#"{"model":"gpt-4o"}"#).unwrap();
        assert_eq!(store.get(SETTINGS_KEY), Some(r#"{"model":"gpt-4o"}"#.to_string()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unreadable_store_blob_counts_as_absent() {
        let store = MemoryStore::default();
        store.set(SETTINGS_KEY, "not json at all").unwrap();
        let r = resolver(BuildDefaults::default(), store);
        assert_eq!(r.stored(), StoredSettings::default());
        assert_eq!(r.resolve().model, FALLBACK_MODEL);
    }
}
