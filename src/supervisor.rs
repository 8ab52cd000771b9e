// src/supervisor.rs

//! Public facade over the registry, launcher, escalator and notifier.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::cancel::{DeferredTasks, EscalationPolicy, Escalator};
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::events::{ChangeNotifier, ChangeSubscription};
use crate::exec::{Launch, Launcher, ResolvedCommand};
use crate::registry::{ProcessHandle, Registry};
use crate::types::{ExecutionResult, ScriptId, surface_path};

/// Default buffer size of the change-event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    pub escalation: EscalationPolicy,
    /// How many change events a slow subscriber may fall behind before it
    /// starts missing them.
    pub event_capacity: usize,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            escalation: EscalationPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl From<&ConfigFile> for SupervisorOptions {
    fn from(cfg: &ConfigFile) -> Self {
        Self {
            escalation: EscalationPolicy {
                unit: cfg.supervisor.escalation_unit,
            },
            event_capacity: cfg.supervisor.event_capacity,
        }
    }
}

#[derive(Debug)]
struct Inner {
    registry: Arc<Registry>,
    launcher: Launcher,
    escalator: Escalator,
}

/// Runs scripts, tracks them while alive, and cancels them on request.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorOptions::default())
    }
}

impl Supervisor {
    pub fn new(options: SupervisorOptions) -> Self {
        let notifier = Arc::new(ChangeNotifier::new(options.event_capacity));
        let registry = Arc::new(Registry::new(notifier));
        let deferred = Arc::new(DeferredTasks::new());

        let launcher = Launcher::new(Arc::clone(&registry), Arc::clone(&deferred));
        let escalator = Escalator::new(Arc::clone(&registry), deferred, options.escalation);

        Self {
            inner: Arc::new(Inner {
                registry,
                launcher,
                escalator,
            }),
        }
    }

    /// Launch `script` with `command`; see [`Launcher::launch`]. The process
    /// is started as the path given here, while the registry keys it by its
    /// canonical identity.
    pub fn launch(&self, script: impl AsRef<Path>, command: &ResolvedCommand) -> Result<Launch> {
        let script = surface_path(script);
        self.inner
            .launcher
            .launch(ScriptId::resolve(&script), &script, command)
    }

    /// Launch and wait for the result.
    pub async fn run(
        &self,
        script: impl AsRef<Path>,
        command: &ResolvedCommand,
    ) -> Result<ExecutionResult> {
        Ok(self.launch(script, command)?.await)
    }

    /// Fire-and-forget cancellation. Returns whether a new escalation started.
    pub fn cancel(&self, script: impl AsRef<Path>) -> bool {
        self.inner.escalator.cancel(&ScriptId::resolve(script))
    }

    pub fn cancel_all(&self) -> usize {
        self.inner.escalator.cancel_all()
    }

    pub fn is_running(&self, script: impl AsRef<Path>) -> bool {
        self.inner.registry.is_running(&ScriptId::resolve(script))
    }

    pub fn running_identities(&self) -> BTreeSet<ScriptId> {
        self.inner.registry.identities()
    }

    pub fn lookup(&self, script: impl AsRef<Path>) -> Option<ProcessHandle> {
        self.inner.registry.lookup(&ScriptId::resolve(script))
    }

    pub fn snapshot(&self) -> HashMap<ScriptId, ProcessHandle> {
        self.inner.registry.snapshot()
    }

    /// Subscribe to "registry changed" events.
    pub fn subscribe(&self) -> ChangeSubscription {
        self.inner.registry.notifier().subscribe()
    }

    pub fn escalation_policy(&self) -> EscalationPolicy {
        self.inner.escalator.policy()
    }
}
