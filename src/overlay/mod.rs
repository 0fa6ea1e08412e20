//! Overlay identity and configuration
//!
//! An overlay is a named set of per-model fixture layers. The base overlay
//! is identified by the empty name, is always present, and has no includes.

mod chain;

pub use chain::resolve_chain;

use serde::{Deserialize, Deserializer};

/// Name of the always-present base overlay.
pub const BASE_OVERLAY: &str = "";

/// File-name of the per-overlay configuration module.
pub const OVERLAY_CONFIG: &str = "_config";

/// Human-readable label for an overlay name, used in provenance and errors.
pub fn overlay_label(name: &str) -> String {
    if name == BASE_OVERLAY {
        "base fixtures".to_string()
    } else {
        format!("overlay `{name}`")
    }
}

/// Declared configuration of one overlay.
///
/// Authored as `{ "include": "other" }` or `{ "include": ["a", "b"] }`;
/// a single name is treated as a one-element list, a missing key as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverlayConfig {
    /// Overlays this one depends on, in declared order.
    #[serde(default, deserialize_with = "one_or_many")]
    pub include: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}
