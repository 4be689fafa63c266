use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// A connection handle that is established on first use and then shared.
///
/// One caller at a time runs the connect future. Callers that queue up behind
/// it share its outcome: the handle on success, a clone of the error on
/// failure. A failure is only handed to callers that overlapped the attempt;
/// the next caller to arrive afterwards connects again.
///
/// # Example
/// ```ignore
/// use database::LazyConnection;
///
/// let client: LazyConnection<Client, MongoError> = LazyConnection::new();
///
/// let handle = client.get_or_connect(|| connect(&url)).await?;
/// ```
pub struct LazyConnection<C, E> {
    cell: OnceCell<C>,
    last_failure: Mutex<Option<E>>,
    failures: AtomicU64,
    attempts: AtomicUsize,
}

impl<C: Clone, E: Clone> LazyConnection<C, E> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            last_failure: Mutex::new(None),
            failures: AtomicU64::new(0),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Return the shared handle, running `connect` only if none exists yet
    /// and no attempt is already in flight.
    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> Result<C, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, E>>,
    {
        if let Some(handle) = self.cell.get() {
            return Ok(handle.clone());
        }

        let seen_failures = self.failures.load(Ordering::SeqCst);
        let mut last_failure = self.last_failure.lock().await;

        if let Some(handle) = self.cell.get() {
            return Ok(handle.clone());
        }

        // An attempt failed while we were queued behind it
        if self.failures.load(Ordering::SeqCst) != seen_failures {
            if let Some(err) = last_failure.as_ref() {
                return Err(err.clone());
            }
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(attempt, "Establishing shared connection");

        match connect().await {
            Ok(handle) => {
                *last_failure = None;
                let _ = self.cell.set(handle.clone());
                Ok(handle)
            }
            Err(err) => {
                *last_failure = Some(err.clone());
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// The established handle, if any. Never connects.
    pub fn get(&self) -> Option<&C> {
        self.cell.get()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }

    /// Number of connection attempts started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<C: Clone, E: Clone> Default for LazyConnection<C, E> {
    fn default() -> Self {
        Self::new()
    }
}
