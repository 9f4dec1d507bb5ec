//! Shared type definitions for Rekt.
//!
//! The crate holds the data model consumed by the registry (which builds it)
//! and the engine (which executes it):
//!
//! - [`ServiceDefinition`]: the declarative input describing a REST service
//! - [`Verb`] and [`ArgsLocation`]: HTTP methods and where their arguments go
//! - [`RequestSchema`], [`ResponseDescriptor`] and [`ResourceDefinition`]:
//!   the immutable per-resource tables derived from a definition

pub mod definition;
pub mod schema;
pub mod verb;

pub use definition::{ResourceBlock, ServiceDefinition};
pub use schema::{ArgumentSpec, RequestSchema, ResourceDefinition, ResponseDescriptor};
pub use verb::{ArgsLocation, ParseVerbError, Verb};
