// src/cancel/mod.rs

//! Cancellation layer.
//!
//! - [`deferred`] is a small keyed scheduler for "run this later" work that
//!   can be aborted once it no longer applies.
//! - [`escalator`] drives one cancel request through interrupt, terminate and
//!   kill using that scheduler.

pub mod deferred;
pub mod escalator;

pub use deferred::DeferredTasks;
pub use escalator::{EscalationPolicy, Escalator, LaunchKey};
