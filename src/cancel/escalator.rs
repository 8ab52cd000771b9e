// src/cancel/escalator.rs

//! Timed cancellation ladder: interrupt, then terminate, then kill.
//!
//! ```text
//! cancel ──► Interrupted (SIGINT)
//!              │ +1 unit, still registered?
//!              ▼
//!            Terminated (SIGTERM)
//!              │ +1 unit, still registered?
//!              ▼
//!            Killed (SIGKILL)
//! ```
//!
//! Every step goes through [`Registry::advance_stage`], which only succeeds
//! when the entry for that exact launch is still present and the stage moves
//! forward. A process that exits mid-ladder therefore turns the remaining
//! steps into no-ops, and a second `cancel` on a handle that is already past
//! `Running` changes nothing. The escalator never removes registry entries;
//! the launcher does that when it observes the exit.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::cancel::deferred::DeferredTasks;
use crate::exec::signal::Signal;
use crate::registry::Registry;
use crate::types::{ScriptId, Stage};

/// Key for deferred escalation work: one script identity, one launch.
pub type LaunchKey = (ScriptId, u64);

/// Grace period between escalation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub unit: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
pub struct Escalator {
    registry: Arc<Registry>,
    deferred: Arc<DeferredTasks<LaunchKey>>,
    policy: EscalationPolicy,
}

impl Escalator {
    pub fn new(
        registry: Arc<Registry>,
        deferred: Arc<DeferredTasks<LaunchKey>>,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            registry,
            deferred,
            policy,
        }
    }

    pub fn policy(&self) -> EscalationPolicy {
        self.policy
    }

    /// Start escalating the process registered for `identity`.
    ///
    /// Returns `true` if this call started a new escalation. Cancelling a
    /// script that is not running, or one that is already escalating, is a
    /// successful no-op.
    pub fn cancel(&self, identity: &ScriptId) -> bool {
        let Some(handle) = self.registry.lookup(identity) else {
            debug!(script = %identity, "cancel requested for script that is not running");
            return false;
        };

        if handle.stage() != Stage::Running {
            debug!(
                script = %identity,
                stage = %handle.stage(),
                "cancel requested while already escalating; ignoring"
            );
            return false;
        }

        let launch_id = handle.launch_id();
        if !step(&self.registry, identity, launch_id, Stage::Interrupted) {
            return false;
        }

        let registry = Arc::clone(&self.registry);
        let unit = self.policy.unit;
        let key = identity.clone();
        let scheduled = self.deferred.schedule((identity.clone(), launch_id), async move {
            for stage in [Stage::Terminated, Stage::Killed] {
                sleep(unit).await;
                if !step(&registry, &key, launch_id, stage) {
                    return;
                }
            }
        });

        if !scheduled {
            debug!(script = %identity, launch_id, "escalation already scheduled");
        }
        true
    }

    /// Escalate every script registered right now. Scripts launched after the
    /// snapshot is taken are untouched. Returns how many escalations started.
    pub fn cancel_all(&self) -> usize {
        let identities = self.registry.identities();
        info!(count = identities.len(), "cancelling all running scripts");
        identities.iter().filter(|id| self.cancel(id)).count()
    }
}

/// Advance one rung and send its signal. `false` when the launch is gone or
/// already at that stage.
fn step(registry: &Registry, identity: &ScriptId, launch_id: u64, stage: Stage) -> bool {
    let Some(handle) = registry.advance_stage(identity, launch_id, stage) else {
        debug!(script = %identity, launch_id, %stage, "escalation step skipped; process gone");
        return false;
    };
    let Some(signal) = Signal::for_stage(stage) else {
        return false;
    };

    info!(
        script = %identity,
        launch_id,
        pid = handle.pid(),
        %stage,
        signal = signal.name(),
        "escalating cancellation"
    );
    if !handle.signal(signal) {
        debug!(script = %identity, launch_id, "launcher already observed exit; signal dropped");
    }
    true
}
