//! Loaded services and their operation tables.

use std::{path::Path, str::FromStr, sync::Arc};

use indexmap::{IndexMap, map::Entry};
use rekt_types::{RequestSchema, ResourceDefinition, ResponseDescriptor, ServiceDefinition, Verb};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{
    DefinitionError,
    config::{definition_from_value, parse_definition, read_definition},
    naming::{async_operation_name, operation_name},
    resource::create_resource_definition,
};

/// How a generated operation returns its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    /// Runs on the caller's thread and returns the response.
    Blocking,
    /// Runs on the client's worker pool and returns a handle.
    Async,
}

/// One row of the operation table: a (resource, verb) pair under a generated name.
#[derive(Debug, Clone, Serialize)]
pub struct OperationEntry {
    pub name: String,
    pub resource: Arc<ResourceDefinition>,
    pub verb: Verb,
    pub mode: CallMode,
    request_schema: RequestSchema,
    response_descriptor: ResponseDescriptor,
}

impl OperationEntry {
    pub fn request_schema(&self) -> &RequestSchema {
        &self.request_schema
    }

    pub fn response_descriptor(&self) -> &ResponseDescriptor {
        &self.response_descriptor
    }

    /// Human readable signature: the name followed by one parameter per line.
    pub fn help(&self) -> String {
        let parameters: Vec<&str> = self.request_schema().names().collect();
        format!("{}\nParameters:\n  {}", self.name, parameters.join("\n  "))
    }
}

/// A service definition compiled into resources and a name-indexed operation table.
///
/// Built once and immutable afterwards. Every supported (resource, verb)
/// pair appears twice in the table: once as a blocking operation and once,
/// with the `async_` prefix, as a non-blocking one.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    name: String,
    resources: Vec<Arc<ResourceDefinition>>,
    operations: IndexMap<String, OperationEntry>,
}

impl ServiceRegistry {
    /// Compiles an in-memory service definition.
    ///
    /// # Errors
    ///
    /// Fails on the first resource that cannot be assembled, or with
    /// [`DefinitionError::DuplicateOperationName`] when two resources map to
    /// the same generated name (for example `Places` and `places`).
    pub fn from_definition(definition: &ServiceDefinition) -> Result<Self, DefinitionError> {
        if definition.name.trim().is_empty() {
            return Err(DefinitionError::InvalidDefinition("service name must not be empty".into()));
        }

        let mut resources = Vec::with_capacity(definition.apis.len());
        for (name, block) in &definition.apis {
            let resource = create_resource_definition(name, block, &definition.base_url)?;
            resources.push(Arc::new(resource));
        }

        let operations = build_operation_table(&resources)?;
        info!(
            service = %definition.name,
            resources = resources.len(),
            operations = operations.len(),
            "service loaded"
        );

        Ok(Self {
            name: definition.name.clone(),
            resources,
            operations,
        })
    }

    /// Compiles a definition supplied as a generic JSON value.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let definition = definition_from_value(value)?;
        Self::from_definition(&definition)
    }

    /// Reads and compiles a YAML or JSON definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let definition = read_definition(path.as_ref())?;
        Self::from_definition(&definition)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label of the generated client, e.g. `"GooglePlacesClient"`.
    pub fn client_type_name(&self) -> String {
        format!("{}Client", self.name)
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> &[Arc<ResourceDefinition>] {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&Arc<ResourceDefinition>> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// All operations, blocking variants first, each group in resource order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationEntry> {
        self.operations.values()
    }

    pub fn operation(&self, name: &str) -> Option<&OperationEntry> {
        self.operations.get(name)
    }
}

impl FromStr for ServiceRegistry {
    type Err = DefinitionError;

    /// Parses YAML (or JSON) text and compiles it.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let definition = parse_definition(text)?;
        Self::from_definition(&definition)
    }
}

fn build_operation_table(resources: &[Arc<ResourceDefinition>]) -> Result<IndexMap<String, OperationEntry>, DefinitionError> {
    let mut pairs: Vec<(&Arc<ResourceDefinition>, Verb, RequestSchema, ResponseDescriptor)> = Vec::new();
    for resource in resources {
        for verb in resource.supported_verbs() {
            let (Some(schema), Some(descriptor)) = (resource.request_schema(verb), resource.response_descriptor(verb)) else {
                continue;
            };
            pairs.push((resource, verb, schema.clone(), descriptor.clone()));
        }
    }

    let blocking = pairs
        .iter()
        .map(|pair| (operation_name(pair.1, &pair.0.name), pair, CallMode::Blocking));
    let non_blocking = pairs
        .iter()
        .map(|pair| (async_operation_name(pair.1, &pair.0.name), pair, CallMode::Async));

    let mut operations: IndexMap<String, OperationEntry> = IndexMap::new();
    for (name, (resource, verb, schema, descriptor), mode) in blocking.chain(non_blocking) {
        match operations.entry(name) {
            Entry::Occupied(existing) => {
                return Err(DefinitionError::DuplicateOperationName {
                    name: existing.key().clone(),
                    first: existing.get().resource.name.clone(),
                    second: resource.name.clone(),
                });
            }
            Entry::Vacant(slot) => {
                let name = slot.key().clone();
                slot.insert(OperationEntry {
                    name,
                    resource: Arc::clone(resource),
                    verb: *verb,
                    mode,
                    request_schema: schema.clone(),
                    response_descriptor: descriptor.clone(),
                });
            }
        }
    }
    Ok(operations)
}
