//! Call arguments and their resolution against a request schema.

use rekt_types::RequestSchema;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::CallError;

/// Keyword arguments supplied to an operation call.
///
/// Order of insertion is irrelevant; the request schema decides the order
/// in which resolved values are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
    }
}

impl TryFrom<Value> for Arguments {
    type Error = Value;

    /// Accepts a JSON object; any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

/// Fully resolved arguments of one call, in signature order.
///
/// Every schema argument is present: supplied values win, omitted ones take
/// their default. A value of `null` (supplied or defaulted) is kept in the
/// record but never transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    values: Map<String, Value>,
}

impl RequestRecord {
    /// Resolves `arguments` against `schema`.
    ///
    /// # Errors
    ///
    /// - [`CallError::UnknownArgument`] for the first supplied name the schema lacks
    /// - [`CallError::MissingArgument`] for the first required argument not supplied
    pub fn build(operation: &str, schema: &RequestSchema, arguments: Arguments) -> Result<Self, CallError> {
        let mut supplied = arguments.into_inner();

        if let Some(unknown) = supplied.keys().find(|name| !schema.contains(name)) {
            return Err(CallError::UnknownArgument {
                operation: operation.to_string(),
                argument: unknown.clone(),
            });
        }

        let mut values = Map::new();
        for argument in schema.arguments() {
            let value = match (supplied.remove(&argument.name), &argument.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(CallError::MissingArgument {
                        operation: operation.to_string(),
                        argument: argument.name.clone(),
                    });
                }
            };
            values.insert(argument.name.clone(), value);
        }

        Ok(Self { values })
    }

    /// All resolved values, `null` included.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Values to transmit: everything except `null`.
    pub fn params(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
