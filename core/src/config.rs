//! Engine configuration, passed to `Engine::reset` and on to the game's
//! `setup` hook.

use crate::{assets::AssetEntry, types::Tick};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_ticks_per_update() -> Tick {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Random seed. `None` seeds from entropy; the chosen seed is still
    /// readable from the engine's random source afterwards.
    #[serde(default)]
    pub seed: Option<String>,
    /// Assets registered on every reset, before preloading.
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    /// Ticks advanced per `run_ticks` step at normal speed.
    #[serde(default = "default_ticks_per_update")]
    pub ticks_per_update: Tick,
    /// Game-specific settings, opaque to the engine.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            assets: Vec::new(),
            ticks_per_update: default_ticks_per_update(),
            settings: Map::new(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file.
    /// In tests, use EngineConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content).map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            seed: Some("test-seed".into()),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: &str) -> Self {
        self.seed = Some(seed.to_string());
        self
    }

    /// A typed game setting, or `None` if missing or of the wrong shape.
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.settings
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ticks_per_update, 1);
    }

    #[test]
    fn parses_full_config() {
        let config = EngineConfig::from_json(
            r#"{
                "seed": "abc",
                "ticks_per_update": 4,
                "assets": [
                    { "id": "hero.png", "kind": "spritesheet" },
                    { "id": "hit.ogg", "kind": "sound" }
                ],
                "settings": { "dots": 12, "title": "demo" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed.as_deref(), Some("abc"));
        assert_eq!(config.assets[0].kind, AssetKind::Spritesheet);
        assert_eq!(config.setting::<u32>("dots"), Some(12));
        assert_eq!(config.setting::<u32>("title"), None);
        assert_eq!(config.setting::<String>("missing"), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = EngineConfig::load("/nonexistent/tickplay.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
