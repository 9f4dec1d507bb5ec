//! Worker pool running asynchronous operations, and handles to their results.
//!
//! Each client owns one [`WorkerPool`]: a multi-threaded Tokio runtime whose
//! worker count matches the configured pool size, plus a semaphore bounding
//! the number of operations in flight to that same size. Submission never
//! blocks: work goes onto an unbounded queue drained by a single dispatcher,
//! which starts each unit once a permit is free, in submission order.
//!
//! Results are delivered through one-shot channels, so a [`Handle`] can be
//! waited on from any thread, or awaited from any runtime.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
};

use anyhow::Context as _;
use futures_util::future::{join_all, select_all};
use rekt_util::block_on_future;
use tokio::{
    runtime::{self, Builder, Runtime},
    sync::{
        Semaphore, mpsc,
        oneshot::{self, error::TryRecvError},
    },
};
use tracing::debug;

use crate::CallError;

/// Fixed-size executor owned by a client.
///
/// Dropping the pool shuts it down without waiting: queued and running
/// work is abandoned and pending handles resolve to [`CallError::Abandoned`].
#[derive(Debug)]
pub struct WorkerPool {
    /// Taken on drop for a non-blocking shutdown.
    runtime: Option<Runtime>,
    executor: runtime::Handle,
    queue: mpsc::UnboundedSender<Job>,
    permits: Arc<Semaphore>,
    size: usize,
    next_id: AtomicU64,
}

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

impl WorkerPool {
    /// Starts a pool with `size` workers (at least one).
    pub fn new(size: usize) -> anyhow::Result<Self> {
        let size = size.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(size)
            .thread_name("rekt-worker")
            .enable_all()
            .build()
            .context("start worker pool")?;
        let permits = Arc::new(Semaphore::new(size));
        let (queue, jobs) = mpsc::unbounded_channel();
        runtime.spawn(dispatch(jobs, Arc::clone(&permits)));
        debug!(size, "worker pool started");
        Ok(Self {
            executor: runtime.handle().clone(),
            runtime: Some(runtime),
            queue,
            permits,
            size,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `future` to completion on the calling thread, driving I/O on the
    /// pool's runtime.
    ///
    /// Panics when called from inside an async context.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.executor.block_on(future)
    }

    /// Queues `future` and returns a handle to its result.
    ///
    /// `operation` labels the handle and any abandonment error.
    pub fn submit<F, T>(&self, operation: &str, future: F) -> Handle<T>
    where
        F: Future<Output = Result<T, CallError>> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, operation, "work submitted");

        // A closed queue drops the job, and with it the sender: the handle
        // then resolves to `Abandoned`.
        let _ = self.queue.send(Box::pin(async move {
            let result = future.await;
            let _ = sender.send(result);
        }));

        Handle {
            id,
            operation: operation.to_string(),
            receiver,
        }
    }
}

/// Starts queued jobs one at a time as permits free up.
///
/// Tokio's semaphore hands out permits in request order, and this loop is
/// the only requester, so jobs start in the order they were queued.
async fn dispatch(mut jobs: mpsc::UnboundedReceiver<Job>, permits: Arc<Semaphore>) {
    while let Some(job) = jobs.recv().await {
        // A closed semaphore means the pool is shutting down.
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            return;
        };
        tokio::spawn(async move {
            job.await;
            drop(permit);
        });
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.permits.close();
        if let Some(runtime) = self.runtime.take() {
            debug!(size = self.size, "worker pool shutting down");
            runtime.shutdown_background();
        }
    }
}

/// Pending result of an asynchronous operation.
///
/// Resolves exactly once, to the operation's response or to its error.
/// Implements [`Future`] for callers that are themselves async.
#[derive(Debug)]
pub struct Handle<T> {
    id: u64,
    operation: String,
    receiver: oneshot::Receiver<Result<T, CallError>>,
}

impl<T> Handle<T> {
    /// Identifier unique within the pool that issued the handle.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Blocks the calling thread until the result is available.
    ///
    /// Panics when called from inside an async context; `.await` the handle
    /// there instead.
    pub fn wait(self) -> Result<T, CallError> {
        match self.receiver.blocking_recv() {
            Ok(result) => result,
            Err(_) => Err(CallError::Abandoned {
                operation: self.operation,
            }),
        }
    }

    /// Returns the result if it is ready, without blocking.
    ///
    /// Yields `Some` at most once; later calls report the handle as abandoned.
    pub fn try_wait(&mut self) -> Option<Result<T, CallError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(self.abandoned())),
        }
    }

    fn abandoned(&self) -> CallError {
        CallError::Abandoned {
            operation: self.operation.clone(),
        }
    }
}

impl<T> Future for Handle<T> {
    type Output = Result<T, CallError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(this.abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// First handle to finish out of a set, plus the ones still pending.
#[derive(Debug)]
pub struct Completed<T> {
    pub id: u64,
    pub operation: String,
    pub result: Result<T, CallError>,
    pub remaining: Vec<Handle<T>>,
}

/// Resolves when the first of `handles` completes. `None` for an empty set.
pub async fn first_completed<T>(handles: Vec<Handle<T>>) -> Option<Completed<T>> {
    if handles.is_empty() {
        return None;
    }
    let labels: Vec<(u64, String)> = handles
        .iter()
        .map(|handle| (handle.id, handle.operation.clone()))
        .collect();
    let (result, index, remaining) = select_all(handles).await;
    let (id, operation) = labels.into_iter().nth(index)?;
    Some(Completed {
        id,
        operation,
        result,
        remaining,
    })
}

/// Resolves when every handle has completed; results keep the input order.
pub async fn all_completed<T>(handles: Vec<Handle<T>>) -> Vec<Result<T, CallError>> {
    join_all(handles).await
}

/// Blocking form of [`first_completed`].
pub fn wait_any<T: Send + 'static>(handles: Vec<Handle<T>>) -> Result<Option<Completed<T>>, CallError> {
    Ok(block_on_future(first_completed(handles))?)
}

/// Blocking form of [`all_completed`].
pub fn wait_all<T: Send + 'static>(handles: Vec<Handle<T>>) -> Result<Vec<Result<T, CallError>>, CallError> {
    Ok(block_on_future(all_completed(handles))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Mutex, atomic::AtomicUsize},
        time::Duration,
    };

    #[test]
    fn handles_resolve_in_any_order() {
        let pool = WorkerPool::new(2).expect("pool");
        let slow = pool.submit("slow", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, CallError>("slow")
        });
        let fast = pool.submit("fast", async { Ok::<_, CallError>("fast") });
        assert_ne!(slow.id(), fast.id());

        assert_eq!(fast.wait().expect("fast"), "fast");
        assert_eq!(slow.wait().expect("slow"), "slow");
    }

    #[test]
    fn excess_work_queues_instead_of_failing() {
        let pool = WorkerPool::new(1).expect("pool");
        let handles: Vec<_> = (0..5)
            .map(|index| {
                pool.submit("count", async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok::<_, CallError>(index)
                })
            })
            .collect();
        let results: Vec<_> = wait_all(handles)
            .expect("runtime")
            .into_iter()
            .map(|result| result.expect("value"))
            .collect();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn queued_work_starts_in_submission_order() {
        let pool = WorkerPool::new(1).expect("pool");
        let started = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let started = Arc::clone(&started);
                pool.submit("ordered", async move {
                    started.lock().expect("lock").push(index);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok::<_, CallError>(())
                })
            })
            .collect();
        for result in wait_all(handles).expect("runtime") {
            result.expect("value");
        }
        assert_eq!(*started.lock().expect("lock"), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn in_flight_work_never_exceeds_pool_size() {
        let pool = WorkerPool::new(2).expect("pool");
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.submit("bounded", async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, CallError>(())
                })
            })
            .collect();
        for result in wait_all(handles).expect("runtime") {
            result.expect("value");
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn block_on_drives_timers_on_the_pool_runtime() {
        let pool = WorkerPool::new(1).expect("pool");
        let value = pool.block_on(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            42
        });
        assert_eq!(value, 42);
    }

    #[test]
    fn wait_any_returns_the_first_finisher() {
        let pool = WorkerPool::new(2).expect("pool");
        let slow = pool.submit("slow", async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, CallError>(1)
        });
        let fast = pool.submit("fast", async { Ok::<_, CallError>(2) });

        let completed = wait_any(vec![slow, fast]).expect("runtime").expect("non-empty");
        assert_eq!(completed.operation, "fast");
        assert_eq!(completed.result.expect("fast"), 2);
        assert_eq!(completed.remaining.len(), 1);
        assert!(wait_any::<u8>(Vec::new()).expect("runtime").is_none());
    }

    #[test]
    fn failures_surface_through_the_handle() {
        let pool = WorkerPool::new(1).expect("pool");
        let handle = pool.submit("broken", async {
            Err::<(), _>(CallError::UnknownOperation("broken".into()))
        });
        assert!(matches!(handle.wait(), Err(CallError::UnknownOperation(_))));
    }

    #[test]
    fn dropping_the_pool_abandons_pending_work() {
        let pool = WorkerPool::new(1).expect("pool");
        let mut handle = pool.submit("sleepy", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, CallError>(())
        });
        assert!(handle.try_wait().is_none());
        drop(pool);
        match handle.wait() {
            Err(CallError::Abandoned { operation }) => assert_eq!(operation, "sleepy"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn handles_can_be_awaited() {
        let pool = WorkerPool::new(1).expect("pool");
        let handle = pool.submit("await", async { Ok::<_, CallError>(7) });
        assert_eq!(handle.await.expect("value"), 7);
        tokio::task::spawn_blocking(move || drop(pool)).await.expect("drop pool");
    }
}
