//! Generated service clients.
//!
//! A [`Service`] is the compiled form of a service definition. Creating a
//! [`Client`] from it binds transport options and starts the client's worker
//! pool. Operations are addressed by their generated names:
//!
//! - `get_places` runs on the caller's thread and returns a [`Response`]
//! - `async_get_places` runs on the worker pool and returns a [`Handle`]

use std::{path::Path, str::FromStr, sync::Arc};

use rekt_api::{ClientOptions, RektHttpClient};
use rekt_registry::{CallMode, DefinitionError, OperationEntry, ServiceRegistry};
use rekt_types::{ResourceDefinition, ServiceDefinition};
use tracing::debug;

use crate::{Arguments, CallError, Handle, Response, WorkerPool, operation::execute};

/// A loaded service, ready to produce clients.
///
/// Cheap to clone; clones share the compiled operation table.
#[derive(Debug, Clone)]
pub struct Service {
    registry: Arc<ServiceRegistry>,
}

impl Service {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn from_definition(definition: &ServiceDefinition) -> Result<Self, DefinitionError> {
        ServiceRegistry::from_definition(definition).map(Self::new)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        ServiceRegistry::from_path(path).map(Self::new)
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn name(&self) -> &str {
        self.registry.name()
    }

    pub fn resources(&self) -> &[Arc<ResourceDefinition>] {
        self.registry.resources()
    }

    /// Creates a client with its own HTTP connection pool and worker pool.
    pub fn client(&self, options: ClientOptions) -> anyhow::Result<Client> {
        Client::new(Arc::clone(&self.registry), options)
    }
}

impl FromStr for Service {
    type Err = DefinitionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.parse::<ServiceRegistry>().map(Self::new)
    }
}

/// Loads a service from an in-memory definition.
pub fn load_service(definition: &ServiceDefinition) -> Result<Service, DefinitionError> {
    Service::from_definition(definition)
}

/// Client for one service.
///
/// Clones share the connection pool and the worker pool. The worker pool is
/// shut down when the last clone is dropped; handles still pending at that
/// point resolve to [`CallError::Abandoned`].
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    registry: Arc<ServiceRegistry>,
    http: RektHttpClient,
    pool: WorkerPool,
}

impl Client {
    pub fn new(registry: Arc<ServiceRegistry>, options: ClientOptions) -> anyhow::Result<Self> {
        let options = Arc::new(options);
        let pool = WorkerPool::new(options.pool_size())?;
        let http = RektHttpClient::new(options)?;
        debug!(service = registry.name(), workers = pool.size(), "client created");
        Ok(Self {
            inner: Arc::new(ClientInner { registry, http, pool }),
        })
    }

    /// Label of the client, e.g. `"GooglePlacesClient"`.
    pub fn type_name(&self) -> String {
        self.inner.registry.client_type_name()
    }

    pub fn service(&self) -> &ServiceRegistry {
        &self.inner.registry
    }

    pub fn options(&self) -> &ClientOptions {
        self.inner.http.options()
    }

    /// Every generated operation, blocking ones first.
    pub fn operations(&self) -> impl Iterator<Item = &OperationEntry> {
        self.inner.registry.operations()
    }

    pub fn operation(&self, name: &str) -> Option<&OperationEntry> {
        self.inner.registry.operation(name)
    }

    /// Calls a blocking operation and waits for its response.
    ///
    /// Must not be called from inside an async context.
    ///
    /// # Errors
    ///
    /// [`CallError::UnknownOperation`] for names the service does not
    /// define, [`CallError::ModeMismatch`] for `async_` names, and any
    /// failure of the call itself.
    pub fn call(&self, name: &str, arguments: impl Into<Arguments>) -> Result<Response, CallError> {
        let entry = self.entry(name, CallMode::Blocking)?;
        self.inner
            .pool
            .block_on(execute(&self.inner.http, entry, arguments.into()))
    }

    /// Submits an `async_` operation to the worker pool.
    ///
    /// Returns as soon as the work is queued. Argument and remote failures
    /// are reported through the handle.
    pub fn submit(&self, name: &str, arguments: impl Into<Arguments>) -> Result<Handle<Response>, CallError> {
        let entry = self.entry(name, CallMode::Async)?.clone();
        let http = self.inner.http.clone();
        let arguments = arguments.into();
        let operation = entry.name.clone();
        let handle = self
            .inner
            .pool
            .submit(&operation, async move { execute(&http, &entry, arguments).await });
        Ok(handle)
    }

    fn entry(&self, name: &str, mode: CallMode) -> Result<&OperationEntry, CallError> {
        let entry = self
            .operation(name)
            .ok_or_else(|| CallError::UnknownOperation(name.to_string()))?;
        if entry.mode != mode {
            let hint = match entry.mode {
                CallMode::Blocking => "call",
                CallMode::Async => "submit",
            };
            return Err(CallError::ModeMismatch {
                operation: name.to_string(),
                mode: entry.mode,
                hint,
            });
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Service {
        "name: Echo\nbase_url: http://127.0.0.1:9\napis:\n  Echo:\n    url: /echo\n    GET:\n      q:\n    OPTIONS:\n      q:\n"
            .parse()
            .expect("load service")
    }

    #[test]
    fn client_exposes_generated_operations() {
        let client = service().client(ClientOptions::default()).expect("client");
        assert_eq!(client.type_name(), "EchoClient");
        let names: Vec<_> = client.operations().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["get_echo", "options_echo", "async_get_echo", "async_options_echo"]);
    }

    #[test]
    fn unknown_and_mismatched_names_are_rejected() {
        let client = service().client(ClientOptions::default()).expect("client");
        assert!(matches!(
            client.call("get_nothing", Arguments::new()),
            Err(CallError::UnknownOperation(name)) if name == "get_nothing"
        ));
        assert!(matches!(
            client.call("async_get_echo", Arguments::new()),
            Err(CallError::ModeMismatch { hint: "submit", .. })
        ));
        assert!(matches!(
            client.submit("get_echo", Arguments::new()),
            Err(CallError::ModeMismatch { hint: "call", .. })
        ));
    }

    #[test]
    fn validation_fails_before_any_request() {
        // Port 9 is never contacted: both calls fail during validation.
        let client = service().client(ClientOptions::default()).expect("client");
        assert!(matches!(
            client.call("get_echo", Arguments::new()),
            Err(CallError::MissingArgument { argument, .. }) if argument == "q"
        ));
        assert!(matches!(
            client.call("options_echo", Arguments::new().with("q", "x")),
            Err(CallError::UnsupportedVerb { .. })
        ));
        let handle = client.submit("async_get_echo", Arguments::new().with("nope", 1)).expect("submitted");
        assert!(matches!(handle.wait(), Err(CallError::UnknownArgument { argument, .. }) if argument == "nope"));
    }

    #[test]
    fn clones_share_the_worker_pool() {
        let client = service().client(ClientOptions::default().with_worker_threads(2)).expect("client");
        let clone = client.clone();
        drop(client);
        assert_eq!(clone.options().pool_size(), 2);
        assert!(clone.operation("get_echo").is_some());
    }
}
