//! Async runtime helpers for blocking callers.
//!
//! This module provides a single entry point for executing async futures from
//! synchronous code paths, reusing the current Tokio runtime when available.

use std::{future::Future, io};

use tokio::{runtime::Handle, task};

/// Execute an async future from synchronous code.
///
/// # Arguments
/// - `future`: The future to run to completion.
///
/// # Returns
/// Returns the future's output or an error if a Tokio runtime cannot be created.
///
/// # Notes
/// - Reuses the current runtime when available; that runtime must be
///   multi-threaded since the calling worker is moved out of the scheduler.
/// - Falls back to a single-threaded runtime for call sites outside Tokio.
/// - Only use it for futures that do not depend on a specific runtime's
///   I/O driver (channel receivers, joins), since the fallback runtime is
///   discarded once the future completes.
pub fn block_on_future<F, T>(future: F) -> io::Result<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        Ok(task::block_in_place(|| handle.block_on(future)))
    } else {
        Ok(tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(future))
    }
}
