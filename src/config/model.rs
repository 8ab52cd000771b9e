// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::exec::ResolvedCommand;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [supervisor]
/// escalation_unit = "1s"
/// event_capacity = 64
///
/// [interpreter]
/// command = "/usr/bin/env python3"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: RawSupervisorSection,

    #[serde(default)]
    pub interpreter: InterpreterSection,
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSupervisorSection {
    /// Grace period between cancellation steps (`"500ms"`, `"1s"`, ...).
    #[serde(default = "default_escalation_unit")]
    pub escalation_unit: String,

    /// Buffer size of the change-event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_escalation_unit() -> String {
    "1s".to_string()
}

fn default_event_capacity() -> usize {
    crate::supervisor::DEFAULT_EVENT_CAPACITY
}

impl Default for RawSupervisorSection {
    fn default() -> Self {
        Self {
            escalation_unit: default_escalation_unit(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// `[interpreter]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InterpreterSection {
    /// Interpreter program and leading arguments, whitespace separated.
    /// The script path is appended when launching.
    #[serde(default)]
    pub command: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub supervisor: SupervisorSection,
    pub interpreter: Option<ResolvedCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSection {
    pub escalation_unit: Duration,
    pub event_capacity: usize,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        supervisor: SupervisorSection,
        interpreter: Option<ResolvedCommand>,
    ) -> Self {
        Self {
            supervisor,
            interpreter,
        }
    }
}
