//! Reading service definitions from YAML or JSON documents.

use std::{fs, path::Path};

use rekt_types::ServiceDefinition;
use serde_json::{Map, Value};

use crate::DefinitionError;

/// Parses a service definition from YAML or JSON text.
///
/// YAML is attempted first (JSON documents are valid YAML in practice); when
/// the text is not YAML it is parsed as JSON. The YAML tree is converted to
/// JSON before deserialization so both formats share a single data model.
pub fn parse_definition(text: &str) -> Result<ServiceDefinition, DefinitionError> {
    let value = match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(yaml) => serde_json::to_value(yaml)?,
        Err(_) => serde_json::from_str::<Value>(text)?,
    };
    definition_from_value(value)
}

/// Converts a generic JSON tree into a service definition.
///
/// Missing `name`, `base_url`, `apis` or resource `url` keys (or keys set to
/// `null`) are reported as [`DefinitionError::InvalidDefinition`]; only
/// values of the wrong type fall through to [`DefinitionError::Json`].
pub fn definition_from_value(value: Value) -> Result<ServiceDefinition, DefinitionError> {
    check_structure(&value)?;
    Ok(serde_json::from_value(value)?)
}

fn check_structure(value: &Value) -> Result<(), DefinitionError> {
    let root = value
        .as_object()
        .ok_or_else(|| invalid("the document must be a mapping".to_string()))?;
    require(root, &["name", "base_url", "apis"], "service definition")?;

    let apis = root
        .get("apis")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("'apis' must map resource names to resource blocks".to_string()))?;
    for (name, block) in apis {
        let block = block
            .as_object()
            .ok_or_else(|| invalid(format!("resource '{}' must be a mapping", name)))?;
        require(block, &["url"], &format!("resource '{}'", name))?;
    }
    Ok(())
}

fn require(mapping: &Map<String, Value>, keys: &[&str], context: &str) -> Result<(), DefinitionError> {
    match keys.iter().find(|key| mapping.get(**key).is_none_or(Value::is_null)) {
        Some(key) => Err(invalid(format!("{} is missing required key '{}'", context, key))),
        None => Ok(()),
    }
}

fn invalid(message: String) -> DefinitionError {
    DefinitionError::InvalidDefinition(message)
}

/// Reads and parses a service definition file.
pub fn read_definition(path: &Path) -> Result<ServiceDefinition, DefinitionError> {
    let text = fs::read_to_string(path)?;
    parse_definition(&text)
}
