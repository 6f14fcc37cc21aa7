//! Per-key request coalescing.
//!
//! The first caller for a key starts the work; callers arriving while it is
//! in flight await the same shared future instead of starting their own.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

type InFlight<V> = Shared<BoxFuture<'static, V>>;

pub struct SingleFlight<V>
where
    V: Clone,
{
    in_flight: Mutex<HashMap<String, InFlight<V>>>,
}

impl<V: Clone> std::fmt::Debug for SingleFlight<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self
            .in_flight
            .lock()
            .map(|m| m.len())
            .unwrap_or_default();
        f.debug_struct("SingleFlight")
            .field("in_flight", &keys)
            .finish()
    }
}

impl<V> Default for SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key` unless a run for the same key is already in
    /// flight, in which case its result is shared.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = {
            let mut in_flight = self.lock();
            if let Some(existing) = in_flight.get(key) {
                tracing::debug!(key, "joining in-flight request");
                existing.clone()
            } else {
                let fut = work().boxed().shared();
                in_flight.insert(key.to_owned(), fut.clone());
                fut
            }
        };

        let value = shared.clone().await;

        // Whoever observes completion first releases the slot; a newer
        // flight under the same key is left alone.
        let mut in_flight = self.lock();
        if in_flight.get(key).is_some_and(|f| f.ptr_eq(&shared)) {
            in_flight.remove(key);
        }
        value
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, InFlight<V>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
