//! Shared helpers for Rekt crates.

pub mod async_runtime;
pub mod http;

pub use async_runtime::block_on_future;
