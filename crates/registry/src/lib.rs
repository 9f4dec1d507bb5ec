//! Registry crate turning declarative service definitions into operation tables.
//!
//! A service definition (resources → verbs → argument declarations) is
//! compiled into immutable [`ResourceDefinition`]s and a name-indexed table
//! of [`OperationEntry`] rows, one blocking and one async row per supported
//! (resource, verb) pair. All validation happens here, at load time.

pub mod clap_builder;
pub mod config;
pub mod error;
pub mod naming;
pub mod resource;
pub mod schema_builder;
pub mod service;

pub use clap_builder::build_clap;
pub use config::{definition_from_value, parse_definition, read_definition};
pub use error::DefinitionError;
pub use rekt_types::{ArgumentSpec, RequestSchema, ResourceDefinition, ResponseDescriptor, ServiceDefinition, Verb};
pub use resource::create_resource_definition;
pub use schema_builder::build_request_schema;
pub use service::{CallMode, OperationEntry, ServiceRegistry};
