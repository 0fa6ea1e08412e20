//! Overlay resolution engine
//!
//! Owns the fixture registry and the two memo tables: resolved chains by
//! overlay name, merged record arrays by (overlay, model). Both caches are
//! lazy and compute-once; errors are never cached, so a cyclic or unknown
//! name deterministically re-reports the same error on every call.
//!
//! Single-threaded by design. Every value crossing the API boundary is a
//! deep copy, callers can never mutate cached state through a result.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::directory::ModuleDirectory;
use crate::error::FixtureError;
use crate::merge::merge_chain;
use crate::overlay::{resolve_chain, BASE_OVERLAY};
use crate::record::Record;
use crate::registry::FixtureRegistry;

/// The overlay resolution engine.
#[derive(Debug)]
pub struct OverlayEngine {
    registry: FixtureRegistry,
    chains: HashMap<String, Vec<String>>,
    merged: HashMap<(String, String), Vec<Record>>,
}

impl OverlayEngine {
    /// Scan `directory` once and build an engine over it.
    pub fn new(directory: &dyn ModuleDirectory) -> Result<Self, FixtureError> {
        Ok(OverlayEngine {
            registry: FixtureRegistry::scan(directory)?,
            chains: HashMap::new(),
            merged: HashMap::new(),
        })
    }

    /// The underlying registry.
    pub fn registry(&self) -> &FixtureRegistry {
        &self.registry
    }

    /// All non-base overlay names, sorted.
    pub fn overlays(&self) -> Vec<String> {
        self.registry
            .overlay_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Resolve the merge chain for `name`, memoized per overlay name.
    pub fn resolve(&mut self, name: &str) -> Result<Vec<String>, FixtureError> {
        if let Some(chain) = self.chains.get(name) {
            return Ok(chain.clone());
        }
        let chain = resolve_chain(&self.registry, name)?;
        self.chains.insert(name.to_string(), chain.clone());
        Ok(chain)
    }

    /// Merge `model`'s layers across `overlay`'s chain, memoized per
    /// (overlay, model) pair.
    pub fn merged(&mut self, overlay: &str, model: &str) -> Result<Vec<Record>, FixtureError> {
        let key = (overlay.to_string(), model.to_string());
        if let Some(records) = self.merged.get(&key) {
            return Ok(records.clone());
        }
        let chain = self.resolve(overlay)?;
        let records = merge_chain(&self.registry, &chain, model)?;
        self.merged.insert(key, records.clone());
        Ok(records)
    }

    /// Serialize the full dataset visible under `overlay` (`None` for base):
    /// every model referenced anywhere in the merge chain, mapped to its
    /// merged record array. The sole call surface external collaborators
    /// need. Results are deep copies.
    pub fn serialize(
        &mut self,
        overlay: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<Record>>, FixtureError> {
        let name = overlay.unwrap_or(BASE_OVERLAY);
        let chain = self.resolve(name)?;
        let models: BTreeSet<String> = chain
            .iter()
            .flat_map(|member| self.registry.models_of(member))
            .map(str::to_string)
            .collect();
        let mut dataset = BTreeMap::new();
        for model in models {
            let records = self.merged(name, &model)?;
            dataset.insert(model, records);
        }
        Ok(dataset)
    }

    /// Drop both memo tables, e.g. at test-suite boundaries.
    pub fn reset(&mut self) {
        self.chains.clear();
        self.merged.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use serde_json::json;

    fn engine() -> OverlayEngine {
        let dir = MemoryDirectory::new()
            .with_module("contact", json!([{"id": 1, "title": "a"}]))
            .with_module("overlays/demo/_config", json!({}))
            .with_module("overlays/demo/contact", json!([{"id": 1, "title": "b"}]))
            .with_module("overlays/demo/account", json!([{"id": 7}]))
            .with_module("overlays/loop-a/_config", json!({"include": "loop-b"}))
            .with_module("overlays/loop-b/_config", json!({"include": "loop-a"}))
            .with_module("overlays/loop-a/pet", json!([{"id": 1}]));
        OverlayEngine::new(&dir).unwrap()
    }

    #[test]
    fn resolve_is_memoized() {
        let mut engine = engine();
        assert_eq!(engine.resolve("demo").unwrap(), vec!["", "demo"]);
        assert!(engine.chains.contains_key("demo"));
        assert_eq!(engine.resolve("demo").unwrap(), vec!["", "demo"]);
    }

    #[test]
    fn failed_resolution_populates_no_memo_table() {
        let mut engine = engine();
        let first = engine.resolve("doesNotExist").unwrap_err().to_string();
        let second = engine.resolve("doesNotExist").unwrap_err().to_string();
        assert_eq!(first, second);
        assert!(engine.chains.is_empty());
        assert!(engine.merged.is_empty());
    }

    #[test]
    fn cyclic_overlays_never_produce_a_dataset() {
        let mut engine = engine();
        assert!(engine.resolve("loop-a").is_err());
        assert!(engine.resolve("loop-b").is_err());
        // `pet` is only touched by the cyclic overlays
        assert!(engine.merged("loop-a", "pet").is_err());
        assert!(engine.chains.is_empty());
        assert!(engine.merged.is_empty());
    }

    #[test]
    fn merged_is_memoized_per_overlay_and_model() {
        let mut engine = engine();
        engine.merged("demo", "contact").unwrap();
        assert!(engine
            .merged
            .contains_key(&("demo".to_string(), "contact".to_string())));
        engine.reset();
        assert!(engine.merged.is_empty());
        assert!(engine.chains.is_empty());
    }

    #[test]
    fn serialize_covers_every_model_in_the_chain() {
        let mut engine = engine();
        let dataset = engine.serialize(Some("demo")).unwrap();
        assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["account", "contact"]);
        // base-only view never sees overlay-declared models
        let dataset = engine.serialize(None).unwrap();
        assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["contact"]);
    }
}
