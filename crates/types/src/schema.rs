//! Derived request and resource tables.
//!
//! A [`ResourceDefinition`] is created once per service load and never
//! mutated afterwards; generated operations hold it behind an `Arc`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Verb;

/// One declared argument of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name as declared in the service definition.
    pub name: String,
    /// Configured default. `Some(Value::Null)` is a legitimate default and
    /// differs from `None`, which marks the argument as required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ArgumentSpec {
    /// An argument every caller must supply.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// An argument that falls back to `default` when omitted.
    pub fn with_default(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Ordered argument signature for one (resource, verb) pair.
///
/// Arguments without defaults come first, followed by arguments with
/// defaults; each group keeps its declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSchema {
    /// Debug label, e.g. `"GetPlacesRequest"`.
    pub type_name: String,
    arguments: Vec<ArgumentSpec>,
}

impl RequestSchema {
    pub fn new(type_name: impl Into<String>, arguments: Vec<ArgumentSpec>) -> Self {
        Self {
            type_name: type_name.into(),
            arguments,
        }
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    /// Argument names in signature order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|argument| argument.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.arguments.iter().position(|argument| argument.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Arguments that must be supplied by every caller.
    pub fn required(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.arguments.iter().filter(|argument| !argument.has_default())
    }

    /// Default table in signature order.
    pub fn defaults(&self) -> IndexMap<&str, &Value> {
        self.arguments
            .iter()
            .filter_map(|argument| argument.default.as_ref().map(|value| (argument.name.as_str(), value)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// Tag identifying the response wrapper of one (resource, verb) pair.
///
/// All responses behave the same; the tag only names them for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// Debug label, e.g. `"GetPlacesResponse"`.
    pub type_name: String,
    pub resource: String,
    pub verb: Verb,
}

impl ResponseDescriptor {
    pub fn new(resource: &str, verb: Verb) -> Self {
        Self {
            type_name: format!("{}{}Response", verb.title(), resource),
            resource: resource.to_string(),
            verb,
        }
    }
}

/// Everything known about one resource of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource name as declared (e.g., `"Places"`).
    pub name: String,
    /// Debug label, e.g. `"PlacesResource"`.
    pub type_name: String,
    /// Base URL and resource path, joined.
    pub url: String,
    request_schemas: IndexMap<Verb, RequestSchema>,
    response_descriptors: IndexMap<Verb, ResponseDescriptor>,
}

impl ResourceDefinition {
    /// Assemble a resource from its per-verb request schemas.
    ///
    /// One response descriptor is derived for every verb present.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        request_schemas: impl IntoIterator<Item = (Verb, RequestSchema)>,
    ) -> Self {
        let name = name.into();
        let request_schemas: IndexMap<Verb, RequestSchema> = request_schemas.into_iter().collect();
        let response_descriptors = request_schemas
            .keys()
            .map(|verb| (*verb, ResponseDescriptor::new(&name, *verb)))
            .collect();
        Self {
            type_name: format!("{}Resource", name),
            name,
            url: url.into(),
            request_schemas,
            response_descriptors,
        }
    }

    /// Verbs this resource supports, in [`Verb::ALL`] order.
    pub fn supported_verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.request_schemas.keys().copied()
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.request_schemas.contains_key(&verb)
    }

    pub fn request_schema(&self, verb: Verb) -> Option<&RequestSchema> {
        self.request_schemas.get(&verb)
    }

    pub fn response_descriptor(&self, verb: Verb) -> Option<&ResponseDescriptor> {
        self.response_descriptors.get(&verb)
    }
}
