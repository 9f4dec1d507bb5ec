//! Decoded operation responses.
//!
//! A [`Response`] wraps the JSON body of a successful call. Attribute access
//! is tolerant: looking up a key that is not there, or indexing past the end
//! of an array, yields an absent [`Attr`] instead of an error. This makes
//! deep lookups such as `response.attr("results").at(0).attr("name")` safe
//! on partial payloads.

use std::{fmt, ops::Index};

use rekt_types::ResponseDescriptor;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Body of a successful operation call.
#[derive(Debug, Clone)]
pub struct Response {
    descriptor: ResponseDescriptor,
    body: Value,
}

impl Response {
    pub fn new(descriptor: ResponseDescriptor, body: Value) -> Self {
        Self { descriptor, body }
    }

    pub fn descriptor(&self) -> &ResponseDescriptor {
        &self.descriptor
    }

    /// Debug label, e.g. `"GetPlacesResponse"`.
    pub fn type_name(&self) -> &str {
        &self.descriptor.type_name
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Top-level attribute lookup.
    pub fn attr(&self, key: &str) -> Attr<'_> {
        Attr::new(&self.body).attr(key)
    }

    /// Dotted path lookup; numeric segments index arrays (`"results.0.name"`).
    pub fn path(&self, path: &str) -> Attr<'_> {
        Attr::new(&self.body).path(path)
    }

    /// Shorthand for `self.path(path).value()`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.path(path).value()
    }

    /// Top-level keys when the body is an object.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        Attr::new(&self.body).keys()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attr(key).value().is_some()
    }
}

/// Missing keys index to `Value::Null`.
impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.body[key]
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl PartialEq<Value> for Response {
    fn eq(&self, other: &Value) -> bool {
        &self.body == other
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

/// Renders the body as block-style YAML.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_yaml::to_string(&self.body) {
            Ok(yaml) => f.write_str(yaml.trim_end()),
            Err(_) => write!(f, "{}", self.body),
        }
    }
}

/// A possibly absent position inside a response body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attr<'a> {
    value: Option<&'a Value>,
}

impl<'a> Attr<'a> {
    pub const ABSENT: Attr<'static> = Attr { value: None };

    pub fn new(value: &'a Value) -> Self {
        Self { value: Some(value) }
    }

    pub fn attr(self, key: &str) -> Attr<'a> {
        Attr {
            value: self.value.and_then(|value| value.get(key)),
        }
    }

    pub fn at(self, index: usize) -> Attr<'a> {
        Attr {
            value: self.value.and_then(|value| value.get(index)),
        }
    }

    pub fn path(self, path: &str) -> Attr<'a> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self, |current, segment| match current.value {
                Some(Value::Array(_)) => match segment.parse::<usize>() {
                    Ok(index) => current.at(index),
                    Err(_) => Attr::ABSENT,
                },
                _ => current.attr(segment),
            })
    }

    /// The value at this position; `None` when the position does not exist.
    pub fn value(self) -> Option<&'a Value> {
        self.value
    }

    /// True when the position does not exist or holds `null`.
    pub fn is_absent(self) -> bool {
        self.value.is_none_or(Value::is_null)
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    pub fn as_i64(self) -> Option<i64> {
        self.value.and_then(Value::as_i64)
    }

    pub fn as_f64(self) -> Option<f64> {
        self.value.and_then(Value::as_f64)
    }

    pub fn as_bool(self) -> Option<bool> {
        self.value.and_then(Value::as_bool)
    }

    /// Elements when this position holds an array; empty otherwise.
    pub fn items(self) -> impl Iterator<Item = Attr<'a>> {
        self.value
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(Attr::new)
    }

    /// Keys when this position holds an object; empty otherwise.
    pub fn keys(self) -> impl Iterator<Item = &'a str> {
        self.value
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|object| object.keys().map(String::as_str))
    }
}

impl fmt::Display for Attr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(Value::String(text)) => f.write_str(text),
            Some(value) => write!(f, "{value}"),
            None => f.write_str("null"),
        }
    }
}
