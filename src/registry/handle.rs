// src/registry/handle.rs

use std::time::SystemTime;

use tokio::sync::mpsc;

use crate::exec::signal::Signal;
use crate::types::{ScriptId, Stage};

/// Registry entry for one in-flight process.
///
/// The `tokio::process::Child` itself is owned by the launcher task that
/// waits on it. The handle reaches the child only through `signals`, which
/// the launcher task drains while the child is alive, so a signal can never
/// be delivered to a pid that has already been reaped and reused.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    identity: ScriptId,
    launch_id: u64,
    pid: u32,
    stage: Stage,
    started_at: SystemTime,
    signals: mpsc::UnboundedSender<Signal>,
}

impl ProcessHandle {
    pub fn new(
        identity: ScriptId,
        launch_id: u64,
        pid: u32,
        signals: mpsc::UnboundedSender<Signal>,
    ) -> Self {
        Self {
            identity,
            launch_id,
            pid,
            stage: Stage::Running,
            started_at: SystemTime::now(),
            signals,
        }
    }

    pub fn identity(&self) -> &ScriptId {
        &self.identity
    }

    /// Distinguishes successive launches of the same script.
    pub fn launch_id(&self) -> u64 {
        self.launch_id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Ask the owning launcher task to deliver `signal`.
    ///
    /// Returns `false` if the launcher has already observed the exit.
    pub fn signal(&self, signal: Signal) -> bool {
        self.signals.send(signal).is_ok()
    }

    /// Only ever moves forward; returns whether the stage changed.
    pub(crate) fn raise_stage(&mut self, to: Stage) -> bool {
        if to > self.stage {
            self.stage = to;
            true
        } else {
            false
        }
    }
}
