//! Flattening of JSON arguments into key/value pairs for query strings and
//! form bodies.

use serde_json::{Map, Value};

/// Flatten an argument map into `(key, value)` pairs.
///
/// Arrays repeat their key once per element and skip `null` elements; strings
/// are sent verbatim and every other value uses its JSON text.
pub fn build_query_pairs(parameters: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in parameters {
        match value {
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    pairs.push((key.clone(), query_value_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), query_value_to_string(other))),
        }
    }
    pairs
}

fn query_value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
