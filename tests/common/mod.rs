#![allow(dead_code)]

use std::time::Duration;

use scriptvisor::cancel::EscalationPolicy;
use scriptvisor::events::{ChangeKind, ChangeSubscription, Notification};
use scriptvisor::{Supervisor, SupervisorOptions};

pub use scriptvisor_test_utils::{init_tracing, wait_until, with_timeout, ScriptDir};

/// Supervisor with a short escalation unit so cancellation tests stay fast.
pub fn supervisor_with_unit(unit: Duration) -> Supervisor {
    Supervisor::new(SupervisorOptions {
        escalation: EscalationPolicy { unit },
        ..SupervisorOptions::default()
    })
}

/// Collect every change event currently buffered for `sub`.
pub fn drain_kinds(sub: &mut ChangeSubscription) -> Vec<ChangeKind> {
    let mut kinds = Vec::new();
    while let Some(notification) = sub.try_recv() {
        match notification {
            Notification::Changed(event) => kinds.push(event.kind),
            Notification::Lagged { missed } => panic!("subscriber lagged by {missed} events"),
        }
    }
    kinds
}
