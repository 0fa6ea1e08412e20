//! Fixture records and provenance tagging
//!
//! A record is a JSON object whose `id` field is its merge identity. Two
//! reserved fields exist: the deletion marker (`__removeFixture`) and the
//! provenance metadata (`_fixtureMeta`), an object holding the ordered list
//! of source labels that contributed to the record.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ValidationError;

/// Reserved field: truthy value means "remove the record with this id".
pub const DELETED_FLAG: &str = "__removeFixture";

/// Reserved field: provenance metadata, `{ "sources": [<label>, ...] }`.
pub const META_FIELD: &str = "_fixtureMeta";

/// Coerce an id value to its textual form.
///
/// Numeric and string ids with the same textual form identify the same
/// record. Other JSON types are not valid ids.
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A single fixture record: a JSON object with a required `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// The record's id, coerced to a string.
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(coerce_id)
    }

    /// Whether this record carries the deletion marker.
    pub fn is_deletion(&self) -> bool {
        self.0.get(DELETED_FLAG).is_some_and(truthy)
    }

    /// Ordered provenance labels accumulated so far.
    pub fn sources(&self) -> Vec<&str> {
        self.0
            .get(META_FIELD)
            .and_then(|meta| meta.get("sources"))
            .and_then(Value::as_array)
            .map(|sources| sources.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Access a plain field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Append `label` to the provenance list unless it was the last entry
    /// added for that exact label.
    pub(crate) fn push_source(&mut self, label: &str) {
        let meta = self
            .0
            .entry(META_FIELD)
            .or_insert_with(|| json!({ "sources": [] }));
        if !meta.is_object() {
            *meta = json!({ "sources": [] });
        }
        if let Some(obj) = meta.as_object_mut() {
            let sources = obj
                .entry("sources")
                .or_insert_with(|| Value::Array(Vec::new()));
            if !sources.is_array() {
                *sources = Value::Array(Vec::new());
            }
            if let Some(list) = sources.as_array_mut() {
                if list.last().and_then(Value::as_str) != Some(label) {
                    list.push(Value::String(label.to_string()));
                }
            }
        }
    }

    /// Shallow-merge `incoming`'s fields onto this record.
    ///
    /// Fields in `incoming` overwrite same-named fields here; fields present
    /// only here are preserved. The provenance field is the one exception:
    /// its source lists are concatenated, never overwritten.
    pub(crate) fn merge_override(&mut self, incoming: &Record) {
        for (field, value) in &incoming.0 {
            if field == META_FIELD {
                continue;
            }
            self.0.insert(field.clone(), value.clone());
        }
        for label in incoming.sources() {
            self.push_source(label);
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

/// Stamps raw records with provenance naming their originating layer.
///
/// One tagger exists per (overlay, model) layer; its source label combines
/// the overlay's human-readable label with the layer's logical module path.
pub struct RecordTagger {
    model: String,
    overlay_label: String,
    source: String,
}

impl RecordTagger {
    /// Create a tagger for the layer at `module_path` authored by the
    /// overlay labelled `overlay_label`.
    pub fn new(overlay_label: &str, model: &str, module_path: &str) -> Self {
        RecordTagger {
            model: model.to_string(),
            overlay_label: overlay_label.to_string(),
            source: format!("{overlay_label} ({module_path})"),
        }
    }

    /// Validate and tag one raw record.
    ///
    /// Pure with respect to `raw`: the caller's value is never mutated, a
    /// tagged copy flows downstream. Fails when the value is not an object
    /// or has no usable `id`, so bad data never enters an accumulator.
    pub fn tag(&self, raw: &Value) -> Result<Record, ValidationError> {
        let map = raw.as_object().ok_or_else(|| ValidationError::NotAnObject {
            model: self.model.clone(),
            overlay: self.overlay_label.clone(),
            record: raw.clone(),
        })?;
        if map.get("id").and_then(coerce_id).is_none() {
            return Err(ValidationError::MissingId {
                model: self.model.clone(),
                overlay: self.overlay_label.clone(),
                record: raw.clone(),
            });
        }
        let mut record = Record(map.clone());
        record.push_source(&self.source);
        Ok(record)
    }
}
