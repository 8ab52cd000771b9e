// src/cancel/deferred.rs

//! Keyed, abortable deferred work.
//!
//! At most one task is pending per key. Scheduling while one is pending is
//! refused, and [`DeferredTasks::cancel`] aborts the pending task, e.g. when
//! the process it was meant to act on has already exited.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;

struct Pending {
    token: u64,
    abort: AbortHandle,
}

pub struct DeferredTasks<K> {
    pending: Arc<Mutex<HashMap<K, Pending>>>,
    next_token: AtomicU64,
}

impl<K> fmt::Debug for DeferredTasks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredTasks").finish_non_exhaustive()
    }
}

impl<K> Default for DeferredTasks<K> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(0),
        }
    }
}

fn lock<K>(map: &Mutex<HashMap<K, Pending>>) -> MutexGuard<'_, HashMap<K, Pending>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K> DeferredTasks<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` on the Tokio runtime under `key`.
    ///
    /// Returns `false` (and drops `work`) if a task for `key` is already
    /// pending. The entry is cleared when `work` finishes or is cancelled.
    pub fn schedule<F>(&self, key: K, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if pending.contains_key(&key) {
            return false;
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let map = Arc::clone(&self.pending);
        let cleanup_key = key.clone();

        // Spawned while holding the lock: the task's own cleanup has to wait
        // for this insert, so it can never run first and leave a stale entry.
        let handle = tokio::spawn(async move {
            work.await;
            let mut pending = lock(&map);
            if pending.get(&cleanup_key).is_some_and(|p| p.token == token) {
                pending.remove(&cleanup_key);
            }
        });

        pending.insert(
            key,
            Pending {
                token,
                abort: handle.abort_handle(),
            },
        );
        true
    }

    /// Abort the task pending under `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.pending).remove(key) {
            Some(p) => {
                p.abort.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.pending).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.pending).is_empty()
    }
}
