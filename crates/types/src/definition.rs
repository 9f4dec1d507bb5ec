//! Declarative service definitions.
//!
//! These types mirror the nested mapping produced by a configuration loader:
//!
//! ```yaml
//! name: GooglePlaces
//! base_url: https://maps.googleapis.com/maps/api/place
//! apis:
//!   Places:
//!     url: /nearbysearch/json
//!     GET:
//!       key:
//!       location:
//!       radius: { default: 5000 }
//! ```
//!
//! Key order is significant (it becomes the argument order of each generated
//! operation), so every mapping is backed by an insertion-ordered map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Verb;

/// Top-level description of a REST service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name; the generated client is labelled `"{name}Client"`.
    pub name: String,
    /// Base URL every resource path is appended to.
    pub base_url: String,
    /// Resource blocks keyed by resource name, in declaration order.
    pub apis: IndexMap<String, ResourceBlock>,
}

/// One resource: a relative URL plus one section per supported verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlock {
    /// Path appended verbatim to the service base URL.
    pub url: String,
    /// Remaining keys of the block. Verb sections (`GET`, `POST`, ...) map
    /// argument names to `null` or to a mapping that may carry a `default`.
    #[serde(flatten)]
    pub sections: IndexMap<String, Value>,
}

impl ResourceBlock {
    /// Raw argument declarations for `verb`.
    ///
    /// Returns `None` when the verb is not declared or declared as `null`.
    pub fn verb_section(&self, verb: Verb) -> Option<&Value> {
        self.sections.get(verb.as_str()).filter(|section| !section.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACES_YAML: &str = r#"
name: GooglePlaces
base_url: https://maps.googleapis.com/maps/api/place
apis:
  Places:
    url: /nearbysearch/json
    GET:
      key:
      location:
      keyword: { default: null }
      radius: { default: 5000 }
  Details:
    url: /details/json
    GET:
      key:
      placeid:
    POST:
"#;

    #[test]
    fn deserializes_nested_definition_preserving_order() {
        let definition: ServiceDefinition = serde_yaml::from_str(PLACES_YAML).expect("parse yaml");
        assert_eq!(definition.name, "GooglePlaces");
        let names: Vec<_> = definition.apis.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Places", "Details"]);

        let places = &definition.apis["Places"];
        assert_eq!(places.url, "/nearbysearch/json");
        let section = places.verb_section(Verb::Get).and_then(Value::as_object).expect("GET section");
        let args: Vec<_> = section.keys().map(String::as_str).collect();
        assert_eq!(args, vec!["key", "location", "keyword", "radius"]);
    }

    #[test]
    fn null_verb_sections_are_treated_as_absent() {
        let definition: ServiceDefinition = serde_yaml::from_str(PLACES_YAML).expect("parse yaml");
        let details = &definition.apis["Details"];
        assert!(details.verb_section(Verb::Get).is_some());
        assert!(details.verb_section(Verb::Post).is_none());
        assert!(details.verb_section(Verb::Delete).is_none());
    }
}
