//! Argument signature derivation for a single (resource, verb) pair.

use indexmap::IndexMap;
use rekt_types::{ArgumentSpec, RequestSchema, Verb};
use serde_json::Value;

use crate::DefinitionError;

/// Builds the request schema for `verb` of `resource` from its raw section.
///
/// The section maps argument names to `null` (no default) or to a mapping
/// that may carry a `default` key. The resulting signature lists arguments
/// without defaults first and arguments with defaults last, each group in
/// declaration order. A `default: null` entry is kept as a real default.
///
/// # Errors
///
/// - [`DefinitionError::InvalidDefinition`] when the section is not a mapping.
/// - [`DefinitionError::Schema`] when a default cannot be located in the
///   derived signature.
pub fn build_request_schema(resource: &str, verb: Verb, section: &Value) -> Result<RequestSchema, DefinitionError> {
    let declarations = section.as_object().ok_or_else(|| {
        DefinitionError::InvalidDefinition(format!(
            "{}.{} must map argument names to null or {{ default: <value> }}",
            resource, verb
        ))
    })?;

    let mut without_default: Vec<&str> = Vec::new();
    let mut with_default: Vec<&str> = Vec::new();
    let mut defaults: IndexMap<&str, Value> = IndexMap::new();

    for (name, declaration) in declarations {
        match declared_default(declaration) {
            Some(default) => {
                with_default.push(name);
                defaults.insert(name, default.clone());
            }
            None => without_default.push(name),
        }
    }

    let signature: Vec<&str> = without_default.into_iter().chain(with_default).collect();
    let mut arguments: Vec<ArgumentSpec> = signature.iter().map(|name| ArgumentSpec::required(*name)).collect();

    for (name, default) in defaults {
        let index = signature
            .iter()
            .position(|candidate| *candidate == name)
            .ok_or_else(|| DefinitionError::Schema {
                resource: resource.to_string(),
                verb,
                argument: name.to_string(),
            })?;
        arguments[index].default = Some(default);
    }

    Ok(RequestSchema::new(
        format!("{}{}Request", verb.title(), resource),
        arguments,
    ))
}

/// Returns the configured default of one argument declaration, if any.
fn declared_default(declaration: &Value) -> Option<&Value> {
    declaration.as_object().and_then(|options| options.get("default"))
}
