//! Record merge engine
//!
//! Folds a merge chain's per-model layers into one final record array.
//! Per layer, in author order: a record carrying the deletion marker removes
//! any accumulated record with the same id (a miss is a no-op); a record
//! matching an accumulated id shallow-merges onto it, concatenating
//! provenance; anything else is inserted as a new record.

use crate::error::FixtureError;
use crate::overlay::overlay_label;
use crate::record::{Record, RecordTagger};
use crate::registry::FixtureRegistry;

/// Fold the layers `chain`'s overlays declare for `model`.
///
/// Overlays without a layer for `model` contribute nothing. Every record is
/// validated and tagged before it touches the accumulator.
pub fn merge_chain(
    registry: &FixtureRegistry,
    chain: &[String],
    model: &str,
) -> Result<Vec<Record>, FixtureError> {
    let mut merged: Vec<Record> = Vec::new();
    for overlay in chain {
        let Some(layer) = registry.layer(overlay, model) else {
            continue;
        };
        let tagger = RecordTagger::new(&overlay_label(overlay), model, &layer.path);
        for raw in &layer.records {
            let record = tagger.tag(raw)?;
            let id = record.id();
            let existing = merged.iter().position(|candidate| candidate.id() == id);
            match existing {
                Some(index) if record.is_deletion() => {
                    merged.remove(index);
                }
                Some(index) => merged[index].merge_override(&record),
                None if record.is_deletion() => {}
                None => merged.push(record),
            }
        }
    }
    Ok(merged)
}
