//! Fixture registry
//!
//! One-time scan of a module directory into overlay configurations and raw
//! per-(overlay, model) fixture layers. The registry is immutable after the
//! scan; raw layers are the source-of-truth and are never mutated, tagged
//! copies flow downstream.

use std::collections::BTreeMap;

use regex_lite::Regex;
use serde_json::Value;

use crate::directory::ModuleDirectory;
use crate::error::DirectoryError;
use crate::overlay::{OverlayConfig, BASE_OVERLAY, OVERLAY_CONFIG};

/// One overlay's raw, author-order record list for one model.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Records exactly as authored.
    pub records: Vec<Value>,
    /// Logical module path the layer was read from.
    pub path: String,
}

/// All overlay configurations and fixture layers known to the engine.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    overlays: BTreeMap<String, OverlayConfig>,
    layers: BTreeMap<String, BTreeMap<String, Layer>>,
}

impl FixtureRegistry {
    /// Read every module the directory lists, classifying each by the
    /// fixture tree path conventions. Paths matching neither convention are
    /// ignored.
    pub fn scan(directory: &dyn ModuleDirectory) -> Result<Self, DirectoryError> {
        let overlay_re = Regex::new(r"^overlays/([^/]+)/([^/]+)$").unwrap();
        let base_re = Regex::new(r"^[^/]+$").unwrap();

        let mut registry = FixtureRegistry::default();
        registry.overlays.insert(BASE_OVERLAY.to_string(), OverlayConfig::default());

        let mut paths = directory.list();
        paths.sort();
        for path in paths {
            let Some(data) = directory.load(&path) else {
                continue;
            };
            if let Some(caps) = overlay_re.captures(&path) {
                let overlay = caps[1].to_string();
                let leaf = caps[2].to_string();
                if leaf == OVERLAY_CONFIG {
                    let config = serde_json::from_value::<OverlayConfig>(data).map_err(
                        |err| DirectoryError::BadModule {
                            path: path.clone(),
                            reason: format!("is not a valid overlay config: {err}"),
                        },
                    )?;
                    registry.overlays.insert(overlay, config);
                } else {
                    registry.insert_layer(overlay, leaf, path, data)?;
                }
            } else if base_re.is_match(&path) {
                let model = path.clone();
                registry.insert_layer(BASE_OVERLAY.to_string(), model, path, data)?;
            }
        }
        Ok(registry)
    }

    fn insert_layer(
        &mut self,
        overlay: String,
        model: String,
        path: String,
        data: Value,
    ) -> Result<(), DirectoryError> {
        let Value::Array(records) = data else {
            return Err(DirectoryError::BadModule {
                path,
                reason: "is not a fixture array".to_string(),
            });
        };
        self.overlays.entry(overlay.clone()).or_default();
        self.layers
            .entry(overlay)
            .or_default()
            .insert(model, Layer { records, path });
        Ok(())
    }

    /// Whether `name` names a known overlay (the base always exists).
    pub fn has_overlay(&self, name: &str) -> bool {
        self.overlays.contains_key(name)
    }

    /// The declared configuration of `name`, if it is a known overlay.
    pub fn config(&self, name: &str) -> Option<&OverlayConfig> {
        self.overlays.get(name)
    }

    /// The raw layer `overlay` declares for `model`, if any.
    pub fn layer(&self, overlay: &str, model: &str) -> Option<&Layer> {
        self.layers.get(overlay).and_then(|models| models.get(model))
    }

    /// Model names `overlay` declares a layer for, sorted.
    pub fn models_of(&self, overlay: &str) -> impl Iterator<Item = &str> {
        self.layers
            .get(overlay)
            .into_iter()
            .flat_map(|models| models.keys().map(String::as_str))
    }

    /// All non-base overlay names, sorted.
    pub fn overlay_names(&self) -> Vec<&str> {
        self.overlays
            .keys()
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .collect()
    }
}
