// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running scripts with
//! `tokio::process::Command` and turning their exit into an
//! [`ExecutionResult`](crate::types::ExecutionResult).
//!
//! - [`command`] holds the resolved interpreter command and builds the child.
//! - [`launcher`] spawns, registers, supervises and reaps one process.
//! - [`drain`] reads stdout/stderr concurrently with the exit wait.
//! - [`signal`] delivers interrupt / terminate / kill to a process group.

pub mod command;
pub mod drain;
pub mod launcher;
pub mod signal;

pub use command::ResolvedCommand;
pub use launcher::{Launch, Launcher};
pub use signal::Signal;
