//! Integration tests: overlay chain resolution
//!
//! Covers chain ordering, de-duplication, cycle detection, and unknown
//! overlay handling through the public engine API.

use serde_json::json;

use fixture_overlay::{MemoryDirectory, OverlayEngine, BASE_OVERLAY};

fn engine(modules: &[(&str, serde_json::Value)]) -> OverlayEngine {
    let mut dir = MemoryDirectory::new();
    for (path, data) in modules {
        dir.insert(path, data.clone());
    }
    OverlayEngine::new(&dir).unwrap()
}

#[test]
fn base_is_always_first_and_nothing_repeats() {
    let mut engine = engine(&[
        ("overlays/c/_config", json!({"include": ["a", "b"]})),
        ("overlays/a/_config", json!({"include": "d"})),
        ("overlays/b/_config", json!({"include": ["d", "a"]})),
        ("overlays/d/_config", json!({})),
    ]);
    let chain = engine.resolve("c").unwrap();
    assert_eq!(chain[0], BASE_OVERLAY);
    assert_eq!(chain.last().map(String::as_str), Some("c"));
    for name in &chain {
        assert_eq!(chain.iter().filter(|other| *other == name).count(), 1);
    }
    // depth-first in include order, first occurrence kept
    assert_eq!(chain, vec!["", "d", "a", "b", "c"]);
}

#[test]
fn resolving_twice_yields_an_identical_sequence() {
    let mut engine = engine(&[
        ("overlays/a/_config", json!({"include": "b"})),
        ("overlays/b/_config", json!({})),
    ]);
    assert_eq!(engine.resolve("a").unwrap(), engine.resolve("a").unwrap());
}

#[test]
fn overlay_known_only_by_its_fixtures_resolves() {
    let mut engine = engine(&[("overlays/demo/contact", json!([{"id": 1}]))]);
    assert_eq!(engine.resolve("demo").unwrap(), vec!["", "demo"]);
}

#[test]
fn cyclic_configuration_fails_from_both_entry_points() {
    let mut engine = engine(&[
        ("overlays/a/_config", json!({"include": "b"})),
        ("overlays/b/_config", json!({"include": "a"})),
        ("overlays/a/contact", json!([{"id": 1}])),
    ]);
    let err = engine.resolve("a").unwrap_err();
    assert_eq!(err.to_string(), "circular overlay inclusion: a -> b -> a");
    let err = engine.resolve("b").unwrap_err();
    assert_eq!(err.to_string(), "circular overlay inclusion: b -> a -> b");
    // no merged dataset is ever produced for a model only they touch
    assert!(engine.merged("a", "contact").is_err());
    assert!(engine.serialize(Some("b")).is_err());
}

#[test]
fn unknown_overlay_fails_deterministically() {
    let mut engine = engine(&[("contact", json!([{"id": 1}]))]);
    let first = engine.resolve("doesNotExist").unwrap_err().to_string();
    let second = engine.resolve("doesNotExist").unwrap_err().to_string();
    assert!(first.contains("unknown overlay `doesNotExist`"));
    assert_eq!(first, second);
    // base remains usable afterwards
    assert_eq!(engine.resolve(BASE_OVERLAY).unwrap(), vec![BASE_OVERLAY]);
}

#[test]
fn include_of_unknown_overlay_names_the_referrer() {
    let mut engine = engine(&[("overlays/demo/_config", json!({"include": "ghost"}))]);
    let err = engine.resolve("demo").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown overlay `ghost`, referenced by overlay `demo`"
    );
}
