// src/events.rs

//! "Registry changed" notifications.
//!
//! The registry publishes one [`RegistryEvent`] per mutation. Publishing is a
//! non-blocking broadcast send, so it is safe to do while the registry lock is
//! held; that is also what keeps the observed event order identical to the
//! mutation order.
//!
//! Consumers should treat every event as "the set of running scripts may have
//! changed" and re-query [`crate::Supervisor::snapshot`]. The identity and kind
//! are there for logging and diagnostics.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::{ScriptId, Stage};

/// What happened to a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Escalated(Stage),
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    /// Monotonic per-notifier sequence number.
    pub seq: u64,
    pub identity: ScriptId,
    pub kind: ChangeKind,
}

/// Message delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Changed(RegistryEvent),
    /// The subscriber fell behind and `missed` events were dropped. The
    /// current state must be re-read from a snapshot.
    Lagged { missed: u64 },
}

/// Publishes registry-mutation events to any number of subscribers.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<RegistryEvent>,
    seq: AtomicU64,
}

impl ChangeNotifier {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            seq: AtomicU64::new(0),
        }
    }

    /// Publish an event. Never blocks; having no subscribers is fine.
    pub fn publish(&self, identity: &ScriptId, kind: ChangeKind) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let event = RegistryEvent {
            seq,
            identity: identity.clone(),
            kind,
        };
        if self.tx.send(event).is_err() {
            debug!(script = %identity, ?kind, "no subscribers for registry change");
        }
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side of a [`ChangeNotifier`].
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: broadcast::Receiver<RegistryEvent>,
}

impl ChangeSubscription {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the notifier has been dropped and every buffered
    /// event has been received.
    pub async fn recv(&mut self) -> Option<Notification> {
        match self.rx.recv().await {
            Ok(event) => Some(Notification::Changed(event)),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "registry change subscriber lagged");
                Some(Notification::Lagged { missed })
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is
    /// buffered right now (or the notifier is gone).
    pub fn try_recv(&mut self) -> Option<Notification> {
        match self.rx.try_recv() {
            Ok(event) => Some(Notification::Changed(event)),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                Some(Notification::Lagged { missed })
            }
            Err(_) => None,
        }
    }
}
