//! Merge chain resolution
//!
//! Computes, for an overlay, the ordered, de-duplicated sequence of overlays
//! to fold: `[base] ++ flatten(transitive parents, depth-first in include
//! order, first occurrence kept) ++ [overlay]`. Cycles and unknown names
//! fail before anything is cached.

use crate::error::ConfigError;
use crate::overlay::{overlay_label, BASE_OVERLAY};
use crate::registry::FixtureRegistry;

/// Resolve the merge chain for `name`.
///
/// The base overlay's chain is just itself. Any other overlay's chain starts
/// at base, then every transitive parent exactly once in depth-first include
/// order, then the overlay itself.
pub fn resolve_chain(registry: &FixtureRegistry, name: &str) -> Result<Vec<String>, ConfigError> {
    if name == BASE_OVERLAY {
        return Ok(vec![BASE_OVERLAY.to_string()]);
    }
    if !registry.has_overlay(name) {
        return Err(ConfigError::UnknownOverlay {
            name: name.to_string(),
            referenced_by: "the active selection".to_string(),
        });
    }

    let mut flat = Vec::new();
    let mut visiting = Vec::new();
    flatten_parents(registry, name, &mut visiting, &mut flat)?;

    let mut chain = vec![BASE_OVERLAY.to_string()];
    for parent in flat {
        if !chain.iter().any(|seen| *seen == parent) {
            chain.push(parent);
        }
    }
    // a cyclic self-reference would have failed above, so `name` is new here
    chain.push(name.to_string());
    Ok(chain)
}

/// Depth-first flattening of `name`'s parents (base excluded), appending
/// each include's own parents before the include itself.
///
/// `visiting` is the resolution path currently on the stack; revisiting a
/// name on it is a cycle and fails with the full path.
fn flatten_parents(
    registry: &FixtureRegistry,
    name: &str,
    visiting: &mut Vec<String>,
    out: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if visiting.iter().any(|seen| seen == name) {
        let mut cycle = visiting.clone();
        cycle.push(name.to_string());
        return Err(ConfigError::CircularInclude { cycle });
    }
    let config = registry.config(name).ok_or_else(|| ConfigError::UnknownOverlay {
        name: name.to_string(),
        referenced_by: visiting
            .last()
            .map(|parent| overlay_label(parent))
            .unwrap_or_else(|| "the active selection".to_string()),
    })?;

    visiting.push(name.to_string());
    for include in &config.include {
        flatten_parents(registry, include, visiting, out)?;
        out.push(include.clone());
    }
    visiting.pop();
    Ok(())
}
