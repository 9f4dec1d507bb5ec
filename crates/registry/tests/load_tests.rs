use std::path::PathBuf;

use rekt_registry::{CallMode, ServiceRegistry, Verb};
use serde_json::{Value, json};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join("places.yaml")
}

fn load_fixture() -> ServiceRegistry {
    ServiceRegistry::from_path(fixture_path()).expect("load registry from fixture")
}

#[test]
fn derives_operation_names_for_every_resource() {
    let registry = load_fixture();
    let names: Vec<_> = registry
        .operations()
        .filter(|entry| entry.mode == CallMode::Blocking)
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["get_places", "get_text_search", "get_places_auto_complete", "get_details"]
    );
    assert!(registry.operation("async_get_places_auto_complete").is_some());
}

#[test]
fn joins_base_url_with_resource_paths() {
    let registry = load_fixture();
    let details = registry.resource("Details").expect("Details resource");
    assert_eq!(details.url, "https://maps.googleapis.com/maps/api/place/details/json");
    assert_eq!(details.supported_verbs().collect::<Vec<_>>(), vec![Verb::Get]);
}

#[test]
fn yaml_empty_defaults_become_null_defaults() {
    let registry = load_fixture();
    let schema = registry.operation("get_places_auto_complete").expect("operation").request_schema();
    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, vec!["key", "input", "offset", "location", "radius", "language", "types"]);
    let defaults: Vec<(&str, Value)> = schema.defaults().into_iter().map(|(name, value)| (name, value.clone())).collect();
    assert_eq!(
        defaults,
        vec![
            ("offset", Value::Null),
            ("location", Value::Null),
            ("radius", Value::Null),
            ("language", json!("en")),
            ("types", Value::Null),
        ]
    );
}

#[test]
fn file_and_text_loading_agree() {
    let text = std::fs::read_to_string(fixture_path()).expect("read fixture");
    let from_text: ServiceRegistry = text.parse().expect("parse fixture");
    let from_file = load_fixture();
    assert_eq!(from_text.name(), from_file.name());
    for (left, right) in from_text.resources().iter().zip(from_file.resources()) {
        assert_eq!(left.as_ref(), right.as_ref());
    }
}
