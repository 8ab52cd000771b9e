// src/registry/mod.rs

//! Process registry: the single source of truth for "what is running".
//!
//! All state lives behind one `std::sync::Mutex`. Nothing inside the critical
//! section blocks: the only side effect besides map mutation is publishing a
//! [`ChangeKind`] through the [`ChangeNotifier`], which is a non-blocking
//! broadcast send. Publishing under the lock keeps the event order observed by
//! subscribers identical to the order of the mutations themselves.
//!
//! Besides live entries the registry tracks *reservations*: a launch reserves
//! its identity before spawning and commits the reservation into an entry
//! once the OS has accepted the process. Reservations are invisible to
//! lookups and snapshots; they only make concurrent duplicate launches fail
//! before anything is spawned.

mod handle;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::errors::{Result, SupervisorError};
use crate::events::{ChangeKind, ChangeNotifier};
use crate::types::{ScriptId, Stage};

pub use handle::ProcessHandle;

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<ScriptId, ProcessHandle>,
    reserved: HashSet<ScriptId>,
}

impl RegistryState {
    fn is_taken(&self, identity: &ScriptId) -> bool {
        self.entries.contains_key(identity) || self.reserved.contains(identity)
    }
}

#[derive(Debug)]
pub struct Registry {
    state: Mutex<RegistryState>,
    notifier: Arc<ChangeNotifier>,
}

impl Registry {
    pub fn new(notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            notifier,
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    // Every critical section leaves the maps consistent, so a poisoned lock
    // still guards valid state.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `identity` ahead of spawning a process for it.
    pub fn reserve(&self, identity: &ScriptId) -> Result<Reservation<'_>> {
        let mut state = self.lock();
        if state.is_taken(identity) {
            return Err(SupervisorError::AlreadyRunning(identity.clone()));
        }
        state.reserved.insert(identity.clone());
        debug!(script = %identity, "reserved script identity");
        Ok(Reservation {
            registry: self,
            identity: identity.clone(),
            committed: false,
        })
    }

    /// Register a handle directly, without a prior reservation.
    ///
    /// Rejects the insert if the identity already has an entry or is
    /// reserved by an in-progress launch.
    pub fn insert(&self, handle: ProcessHandle) -> Result<()> {
        let mut state = self.lock();
        let identity = handle.identity().clone();
        if state.is_taken(&identity) {
            return Err(SupervisorError::AlreadyRunning(identity));
        }
        state.entries.insert(identity.clone(), handle);
        self.notifier.publish(&identity, ChangeKind::Inserted);
        Ok(())
    }

    /// Remove whatever entry is registered for `identity`.
    pub fn remove(&self, identity: &ScriptId) -> Option<ProcessHandle> {
        let mut state = self.lock();
        let removed = state.entries.remove(identity);
        if removed.is_some() {
            self.notifier.publish(identity, ChangeKind::Removed);
        }
        removed
    }

    /// Remove the entry for `identity` only if it belongs to `launch_id`.
    pub fn remove_launch(&self, identity: &ScriptId, launch_id: u64) -> Option<ProcessHandle> {
        let mut state = self.lock();
        match state.entries.get(identity) {
            Some(handle) if handle.launch_id() == launch_id => {}
            _ => return None,
        }
        let removed = state.entries.remove(identity);
        self.notifier.publish(identity, ChangeKind::Removed);
        removed
    }

    pub fn lookup(&self, identity: &ScriptId) -> Option<ProcessHandle> {
        self.lock().entries.get(identity).cloned()
    }

    pub fn snapshot(&self) -> HashMap<ScriptId, ProcessHandle> {
        self.lock().entries.clone()
    }

    pub fn identities(&self) -> BTreeSet<ScriptId> {
        self.lock().entries.keys().cloned().collect()
    }

    pub fn is_running(&self, identity: &ScriptId) -> bool {
        self.lock().entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Move the handle for `(identity, launch_id)` forward to `to`.
    ///
    /// Returns the updated handle when the stage actually advanced; `None`
    /// when the entry is gone, belongs to another launch, or is already at
    /// or beyond `to`.
    pub fn advance_stage(
        &self,
        identity: &ScriptId,
        launch_id: u64,
        to: Stage,
    ) -> Option<ProcessHandle> {
        let mut state = self.lock();
        let handle = state.entries.get_mut(identity)?;
        if handle.launch_id() != launch_id || !handle.raise_stage(to) {
            return None;
        }
        let updated = handle.clone();
        self.notifier.publish(identity, ChangeKind::Escalated(to));
        Some(updated)
    }
}

/// An identity claimed by an in-progress launch.
///
/// Dropping it without calling [`commit`](Self::commit) releases the claim,
/// which is what happens when spawning fails.
#[derive(Debug)]
pub struct Reservation<'a> {
    registry: &'a Registry,
    identity: ScriptId,
    committed: bool,
}

impl Reservation<'_> {
    pub fn identity(&self) -> &ScriptId {
        &self.identity
    }

    /// Turn the reservation into a live entry and announce it.
    pub fn commit(mut self, handle: ProcessHandle) {
        debug_assert_eq!(handle.identity(), &self.identity);
        let mut state = self.registry.lock();
        state.reserved.remove(&self.identity);
        state.entries.insert(self.identity.clone(), handle);
        self.registry
            .notifier
            .publish(&self.identity, ChangeKind::Inserted);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.lock().reserved.remove(&self.identity);
            debug!(script = %self.identity, "released script reservation");
        }
    }
}
