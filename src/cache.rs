use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::Result;

struct Cached<T> {
    snapshot: Option<Arc<T>>,
    fetched_at: Option<Instant>,
    last_failure: Option<crate::Error>,
}

/// Last known device state plus the single-flight refresh gate.
///
/// The mutex is the gate: whoever holds it is the only caller allowed to
/// talk to the device. Callers queued behind it either find a fresh
/// snapshot once they get in, or receive the failure of the refresh they
/// waited on.
pub struct StateCache<T> {
    min_interval: Duration,
    refreshes: AtomicU64,
    inner: Mutex<Cached<T>>,
}

impl<T> StateCache<T> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            refreshes: AtomicU64::new(0),
            inner: Mutex::new(Cached {
                snapshot: None,
                fetched_at: None,
                last_failure: None,
            }),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Serve the cached snapshot if it is younger than the poll interval,
    /// otherwise run `fetch` once and store what it returns.
    ///
    /// A failed fetch leaves the previous snapshot and its timestamp alone.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let seen = self.refreshes.load(Ordering::Acquire);
        let mut cached = self.inner.lock().await;

        if self.refreshes.load(Ordering::Acquire) != seen
            && let Some(err) = &cached.last_failure
        {
            trace!("sharing failure of the refresh we waited on");
            return Err(err.clone());
        }

        if let (Some(snapshot), Some(at)) = (&cached.snapshot, cached.fetched_at)
            && at.elapsed() <= self.min_interval
        {
            trace!(age_ms = at.elapsed().as_millis() as u64, "state cache hit");
            return Ok(Arc::clone(snapshot));
        }

        debug!("refreshing device state");
        let result = fetch().await;
        self.refreshes.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(state) => {
                let state = Arc::new(state);
                cached.snapshot = Some(Arc::clone(&state));
                cached.fetched_at = Some(Instant::now());
                cached.last_failure = None;
                Ok(state)
            }
            Err(err) => {
                cached.last_failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The current snapshot without touching the device.
    pub async fn peek(&self) -> Option<Arc<T>> {
        self.inner.lock().await.snapshot.clone()
    }

    pub async fn fetched_at(&self) -> Option<Instant> {
        self.inner.lock().await.fetched_at
    }
}
