use rekt_types::Verb;
use thiserror::Error;

/// Load-time failures while turning a service definition into an operation table.
///
/// Every variant is fatal to the load: a service is either fully assembled or
/// not produced at all.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A declared default could not be placed in the derived signature.
    #[error("schema error in {resource}.{verb}: default for argument '{argument}' is not part of the derived signature")]
    Schema {
        resource: String,
        verb: Verb,
        argument: String,
    },
    /// Two (resource, verb) pairs resolved to the same generated operation name.
    #[error("duplicate operation name '{name}' generated for resources '{first}' and '{second}'")]
    DuplicateOperationName { name: String, first: String, second: String },
    /// The definition does not have the expected shape.
    #[error("invalid service definition: {0}")]
    InvalidDefinition(String),
    /// Base URL and resource path do not join into a parseable URL.
    #[error("resource '{resource}' has an invalid url '{url}': {source}")]
    InvalidUrl {
        resource: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("service definition I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("service definition YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("service definition JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
