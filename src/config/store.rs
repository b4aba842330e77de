//! Configuration loading, persistence and change notification.
//!
//! The on-disk document is YAML. Loading never fails: a missing file is
//! seeded with defaults, an unparseable one falls back to defaults, and a
//! partial one is deep-merged so every documented key is present. Keys the
//! application does not know about are preserved across a save.

use crate::{LucidError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Providers known to the settings UI, in display order.
pub const PROVIDERS: &[&str] = &[
    "openai",
    "gemini",
    "groq",
    "deepseek",
    "ollama",
    "phind",
    "pollinations",
];

/// Sentinel API-key value for providers that need no key, only a toggle.
pub const KEYLESS_SENTINEL: &str = "enabled";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_keys")]
    pub api_keys: BTreeMap<String, String>,

    #[serde(default = "default_enabled_models")]
    pub enabled_models: BTreeMap<String, bool>,

    #[serde(default = "default_openai_api_base", alias = "openai_url")]
    pub openai_api_base: String,

    #[serde(default = "default_selected_model")]
    pub selected_model: String,

    /// Milliseconds per revealed character; 0 renders responses instantly.
    #[serde(default = "default_text_speed")]
    pub text_speed: u64,

    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,

    #[serde(default = "default_shortcut_open_chat")]
    pub shortcut_open_chat: String,

    #[serde(default = "default_shortcut_open_chat_voice")]
    pub shortcut_open_chat_voice: String,

    #[serde(default)]
    pub run_on_startup: bool,

    /// Keys from newer or external versions of the config document.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_api_keys() -> BTreeMap<String, String> {
    let mut keys = BTreeMap::new();
    for provider in PROVIDERS {
        let value = match *provider {
            "ollama" | "phind" | "pollinations" => KEYLESS_SENTINEL,
            _ => "",
        };
        keys.insert(provider.to_string(), value.to_string());
    }
    keys
}

fn default_enabled_models() -> BTreeMap<String, bool> {
    PROVIDERS
        .iter()
        .map(|p| (p.to_string(), matches!(*p, "phind" | "pollinations")))
        .collect()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_selected_model() -> String {
    "phind".to_string()
}

fn default_text_speed() -> u64 {
    20
}

fn default_tts_voice() -> String {
    "en-GB-RyanNeural".to_string()
}

fn default_shortcut_open_chat() -> String {
    "ctrl+l".to_string()
}

fn default_shortcut_open_chat_voice() -> String {
    "ctrl+shift+l".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: default_api_keys(),
            enabled_models: default_enabled_models(),
            openai_api_base: default_openai_api_base(),
            selected_model: default_selected_model(),
            text_speed: default_text_speed(),
            tts_voice: default_tts_voice(),
            shortcut_open_chat: default_shortcut_open_chat(),
            shortcut_open_chat_voice: default_shortcut_open_chat_voice(),
            run_on_startup: false,
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Default on-disk location of the configuration document.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lucid")
            .join("config.yaml")
    }

    /// Load the configuration from `path`.
    ///
    /// A missing file is created with defaults. A corrupt file falls back to
    /// defaults without touching the on-disk copy. Startup never fails here.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                warn!("Could not seed default config at {:?}: {}", path, e);
            }
            return config;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read config {:?}: {}, using defaults", path, e);
                return Self::default();
            }
        };

        match serde_yaml::from_str::<Config>(&text) {
            Ok(config) => config.merged_with_defaults(),
            Err(e) => {
                warn!("Invalid config {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Write the full document to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_yaml::to_string(self)
            .map_err(|e| LucidError::Config(format!("serialize config: {}", e)))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Fill in any provider entries the loaded document is missing.
    ///
    /// Scalar fields are already defaulted by serde; only the nested maps
    /// need a per-key merge.
    fn merged_with_defaults(mut self) -> Self {
        for (provider, key) in default_api_keys() {
            self.api_keys.entry(provider).or_insert(key);
        }
        for (provider, enabled) in default_enabled_models() {
            self.enabled_models.entry(provider).or_insert(enabled);
        }
        self
    }

    /// API key configured for `provider`, empty string if unset.
    pub fn api_key(&self, provider: &str) -> &str {
        self.api_keys.get(provider).map(String::as_str).unwrap_or("")
    }
}

/// Shared configuration handle.
///
/// Components take snapshots via [`ConfigStore::get`] and learn about settings
/// changes through a subscription channel rather than global mutable state.
pub struct ConfigStore {
    current: RwLock<Config>,
    path: PathBuf,
    watchers: Mutex<Vec<Sender<Config>>>,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Config::load(&path);
        Self {
            current: RwLock::new(current),
            path,
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Current settings snapshot.
    pub fn get(&self) -> Config {
        self.current.read().clone()
    }

    /// Receive a copy of the configuration every time it is applied.
    pub fn subscribe(&self) -> Receiver<Config> {
        let (tx, rx) = unbounded();
        self.watchers.lock().push(tx);
        rx
    }

    /// Persist and publish a new configuration.
    pub fn apply(&self, config: Config) -> Result<()> {
        config.save(&self.path)?;
        *self.current.write() = config.clone();

        // Drop watchers whose receiving end has gone away.
        self.watchers
            .lock()
            .retain(|tx| tx.send(config.clone()).is_ok());

        info!("Applied configuration (model: {})", config.selected_model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_providers() {
        let config = Config::default();
        for provider in PROVIDERS {
            assert!(config.api_keys.contains_key(*provider));
            assert!(config.enabled_models.contains_key(*provider));
        }
        assert_eq!(config.api_key("phind"), KEYLESS_SENTINEL);
        assert_eq!(config.api_key("openai"), "");
        assert_eq!(config.text_speed, 20);
    }

    #[test]
    fn load_missing_file_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config::load(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_keys: [not, a, map").unwrap();

        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn partial_document_is_deep_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "selected_model: gpt-4o\napi_keys:\n  openai: sk-test\n",
        )
        .unwrap();

        let config = Config::load(&path);
        assert_eq!(config.selected_model, "gpt-4o");
        assert_eq!(config.api_key("openai"), "sk-test");
        // Missing nested entries filled from defaults.
        assert_eq!(config.api_key("phind"), KEYLESS_SENTINEL);
        assert_eq!(config.text_speed, 20);
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "theme: midnight\nselected_model: phind\n").unwrap();

        let config = Config::load(&path);
        assert!(config.extra.contains_key("theme"));

        config.save(&path).unwrap();
        let reloaded = Config::load(&path);
        assert_eq!(
            reloaded.extra.get("theme"),
            Some(&serde_yaml::Value::from("midnight"))
        );
    }

    #[test]
    fn apply_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("config.yaml"));
        let rx = store.subscribe();

        let mut config = store.get();
        config.selected_model = "gemini-pro".to_string();
        store.apply(config).unwrap();

        let seen = rx.try_recv().unwrap();
        assert_eq!(seen.selected_model, "gemini-pro");
        assert_eq!(store.get().selected_model, "gemini-pro");
    }
}
