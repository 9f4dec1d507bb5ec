//! # Rekt Engine
//!
//! Turns a loaded service into a working client. Every (resource, verb) pair
//! of the service yields two operations:
//!
//! - a blocking one, e.g. `get_places`, that returns a [`Response`]
//! - an asynchronous one, e.g. `async_get_places`, that returns a [`Handle`]
//!   resolved by the client's [`WorkerPool`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rekt_api::ClientOptions;
//! use rekt_engine::{Arguments, Service, wait_all};
//!
//! let service: Service = std::fs::read_to_string("places.yaml")?.parse()?;
//! let client = service.client(ClientOptions::default())?;
//!
//! let places = client.call("get_places", Arguments::new().with("key", "abc").with("location", "1,2"))?;
//! println!("{}", places.attr("results").at(0).attr("name"));
//!
//! let handles = vec![
//!     client.submit("async_get_details", Arguments::new().with("key", "abc").with("placeid", "p1"))?,
//!     client.submit("async_get_details", Arguments::new().with("key", "abc").with("placeid", "p2"))?,
//! ];
//! for details in wait_all(handles)? {
//!     println!("{}", details?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - **`arguments`**: call arguments and their resolution against a schema
//! - **`operation`**: request building and response decoding for one call
//! - **`pool`**: worker pool, handles and wait combinators
//! - **`response`**: tolerant attribute access over response bodies
//! - **`client`**: services and the clients they produce

pub mod arguments;
pub mod client;
pub mod error;
pub mod operation;
pub mod pool;
pub mod response;

pub use arguments::{Arguments, RequestRecord};
pub use client::{Client, Service, load_service};
pub use error::CallError;
pub use operation::execute;
pub use pool::{Completed, Handle, WorkerPool, all_completed, first_completed, wait_all, wait_any};
pub use response::{Attr, Response};
