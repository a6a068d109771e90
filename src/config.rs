//! Runtime configuration.
//!
//! Loaded from YAML; every section is optional and falls back to the built-in
//! defaults, so an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use action_locator::{FieldRole, SelectorCatalog};
use generation_client::DEFAULT_ENDPOINT;
use mutation_watcher::DEFAULT_SETTLE_DELAY;
use serde::{Deserialize, Serialize};
use settings_surface::{ControllerOptions, OverlayPlacement};
use tracing::info;

/// Environment variable that overrides `generation.endpoint`.
pub const ENDPOINT_ENV: &str = "MAILASSIST_ENDPOINT";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub generation: GenerationConfig,
    pub watcher: WatcherConfig,
    pub overlay: OverlayConfig,
    /// Per-role pattern lists replacing the built-in chains.
    pub selectors: BTreeMap<FieldRole, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    #[serde(flatten)]
    pub placement: OverlayPlacement,
    pub alert_on_missing_compose: bool,
}

impl AssistConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                info!(endpoint, "Using generation endpoint from {}", ENDPOINT_ENV);
                self.generation.endpoint = endpoint.to_string();
            }
        }
    }

    pub fn catalog(&self) -> SelectorCatalog {
        SelectorCatalog::with_overrides(&self.selectors)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            placement: self.overlay.placement.clone(),
            alert_on_missing_compose: self.overlay.alert_on_missing_compose,
        }
    }
}

mod humantime_serde {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim())
            .map_err(|err| de::Error::custom(format!("invalid duration '{raw}': {err}")))
    }
}
