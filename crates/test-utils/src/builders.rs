#![allow(dead_code)]

use scriptvisor::config::{ConfigFile, InterpreterSection, RawConfigFile, RawSupervisorSection};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                supervisor: RawSupervisorSection::default(),
                interpreter: InterpreterSection::default(),
            },
        }
    }

    pub fn escalation_unit(mut self, unit: &str) -> Self {
        self.config.supervisor.escalation_unit = unit.to_string();
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.supervisor.event_capacity = capacity;
        self
    }

    pub fn interpreter(mut self, command: &str) -> Self {
        self.config.interpreter.command = Some(command.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
