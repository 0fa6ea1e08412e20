//! Integration tests: serialized dataset builder
//!
//! Model enumeration across the chain, idempotence, and defensive copying.

use serde_json::json;

use fixture_overlay::{MemoryDirectory, OverlayEngine};

fn engine() -> OverlayEngine {
    let dir = MemoryDirectory::new()
        .with_module("contact", json!([{"id": 1, "title": "a"}]))
        .with_module("overlays/common/account", json!([{"id": "x", "plan": "free"}]))
        .with_module("overlays/demo/_config", json!({"include": "common"}))
        .with_module("overlays/demo/contact", json!([{"id": 1, "title": "b"}]));
    OverlayEngine::new(&dir).unwrap()
}

#[test]
fn every_model_referenced_in_the_chain_appears() {
    let mut engine = engine();
    let dataset = engine.serialize(Some("demo")).unwrap();
    // `account` comes from an included overlay, `contact` from base + demo
    assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["account", "contact"]);
    assert_eq!(dataset["account"].len(), 1);
    assert_eq!(dataset["contact"][0].get("title"), Some(&json!("b")));
}

#[test]
fn base_serialization_ignores_overlay_models() {
    let mut engine = engine();
    let dataset = engine.serialize(None).unwrap();
    assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["contact"]);
    assert_eq!(dataset["contact"][0].get("title"), Some(&json!("a")));
}

#[test]
fn serializing_twice_is_deep_equal() {
    let mut engine = engine();
    let first = engine.serialize(Some("demo")).unwrap();
    let second = engine.serialize(Some("demo")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mutating_one_result_never_affects_the_next() {
    let mut engine = engine();
    let pristine = engine.serialize(Some("demo")).unwrap();
    let mut first = engine.serialize(Some("demo")).unwrap();
    first.get_mut("contact").unwrap().clear();
    first.remove("account");
    let second = engine.serialize(Some("demo")).unwrap();
    assert_eq!(second, pristine);
}

#[test]
fn serialized_records_carry_provenance_metadata() {
    let mut engine = engine();
    let dataset = engine.serialize(Some("demo")).unwrap();
    let json = serde_json::to_value(&dataset).unwrap();
    let sources = &json["contact"][0]["_fixtureMeta"]["sources"];
    assert_eq!(
        sources,
        &json!([
            "base fixtures (contact)",
            "overlay `demo` (overlays/demo/contact)"
        ])
    );
}

#[test]
fn model_only_deleted_by_an_overlay_still_appears_empty() {
    let dir = MemoryDirectory::new()
        .with_module("overlays/demo/pet", json!([{"id": 5, "__removeFixture": true}]));
    let mut engine = OverlayEngine::new(&dir).unwrap();
    let dataset = engine.serialize(Some("demo")).unwrap();
    assert_eq!(dataset.keys().collect::<Vec<_>>(), vec!["pet"]);
    assert!(dataset["pet"].is_empty());
}
