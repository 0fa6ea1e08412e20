//! Error types for the fixture overlay engine
//!
//! Each subsystem has its own thiserror enum; `FixtureError` aggregates them
//! for the public API surface. All fatal conditions are detected at
//! resolution time and propagate synchronously to the caller.

use serde_json::Value;

/// Overlay configuration errors: unknown names and cyclic inclusions.
///
/// These are fatal and never recovered; repeated resolution of the same
/// name re-reports the same error without touching the caches.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An include (or the requested overlay itself) names an overlay that
    /// has no configuration module and no fixture layer.
    #[error("unknown overlay `{name}`, referenced by {referenced_by}")]
    UnknownOverlay {
        /// The name that could not be resolved
        name: String,
        /// Human-readable label of what referenced it
        referenced_by: String,
    },

    /// The include graph contains a cycle.
    #[error("circular overlay inclusion: {}", .cycle.join(" -> "))]
    CircularInclude {
        /// The inclusion path, ending with the repeated overlay
        cycle: Vec<String>,
    },
}

/// Raw fixture record validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A fixture record has no usable `id` field.
    #[error("fixture record is missing an `id` (model `{model}` from {overlay}, record: {record})")]
    MissingId {
        /// Model the record was authored for
        model: String,
        /// Label of the overlay that authored the record
        overlay: String,
        /// The offending raw record
        record: Value,
    },

    /// A fixture layer entry is not a JSON object.
    #[error("fixture record is not an object (model `{model}` from {overlay}, record: {record})")]
    NotAnObject {
        /// Model the record was authored for
        model: String,
        /// Label of the overlay that authored the record
        overlay: String,
        /// The offending raw value
        record: Value,
    },
}

/// Errors surfaced by module directories and the registry scan.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("I/O error reading fixture tree: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to walk fixture tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("module `{path}` is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A module exists but its shape does not match its role
    /// (config modules must be objects, fixture layers must be arrays).
    #[error("module `{path}` {reason}")]
    BadModule { path: String, reason: String },
}

/// Errors from the overlay selection store.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("failed to access persisted overlay selection: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type returned by the engine and CLI.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn circular_include_names_full_cycle() {
        let err = ConfigError::CircularInclude {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "circular overlay inclusion: a -> b -> a");
    }

    #[test]
    fn missing_id_identifies_model_overlay_and_record() {
        let err = ValidationError::MissingId {
            model: "contact".to_string(),
            overlay: "overlay `demo`".to_string(),
            record: json!({"title": "x"}),
        };
        let msg = err.to_string();
        assert!(msg.contains("model `contact`"));
        assert!(msg.contains("overlay `demo`"));
        assert!(msg.contains("\"title\":\"x\""));
    }
}
