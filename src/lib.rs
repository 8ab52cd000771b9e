// src/lib.rs

pub mod cancel;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod exec;
pub mod logging;
pub mod registry;
pub mod supervisor;
pub mod types;

pub use exec::{Launch, ResolvedCommand};
pub use supervisor::{Supervisor, SupervisorOptions};
pub use types::{ExecutionResult, ScriptId, Stage};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, parse_duration};
use crate::errors::SupervisorError;
use crate::events::Notification;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the interpreter override
/// - the supervisor
/// - a change-event logger
/// - the optional timeout and Ctrl-C, both of which cancel everything
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref()).context("loading configuration")?;

    let command = match args.interpreter.as_deref() {
        Some(interpreter) => ResolvedCommand::from_interpreter(interpreter)?,
        None => cfg.interpreter.clone().ok_or_else(|| {
            SupervisorError::ConfigError(
                "no interpreter configured; pass --interpreter or set [interpreter].command"
                    .to_string(),
            )
        })?,
    };

    let timeout = args
        .timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| SupervisorError::ConfigError(format!("--timeout: {e}")))?;

    if args.dry_run {
        print_dry_run(&cfg, &command, &args);
        return Ok(());
    }

    let supervisor = Supervisor::new(SupervisorOptions::from(&cfg));
    info!(
        scripts = args.scripts.len(),
        escalation_unit = ?supervisor.escalation_policy().unit,
        interpreter = %command,
        "supervisor ready"
    );

    // Registry changes → debug log.
    {
        let mut events = supervisor.subscribe();
        tokio::spawn(async move {
            while let Some(notification) = events.recv().await {
                match notification {
                    Notification::Changed(event) => {
                        debug!(
                            seq = event.seq,
                            script = %event.identity,
                            kind = ?event.kind,
                            "registry changed"
                        );
                    }
                    Notification::Lagged { missed } => {
                        debug!(missed, "registry change log lagged");
                    }
                }
            }
        });
    }

    // Ctrl-C → cancel everything.
    {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling running scripts");
            supervisor.cancel_all();
        });
    }

    let mut launches = Vec::with_capacity(args.scripts.len());
    let mut failed = 0usize;

    for script in &args.scripts {
        match supervisor.launch(script, &command) {
            Ok(launch) => launches.push(launch),
            Err(SupervisorError::AlreadyRunning(identity)) => {
                warn!(script = %identity, "script listed more than once; skipping duplicate");
                println!("== {identity}\nalready running");
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(timeout) = timeout {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if !supervisor.running_identities().is_empty() {
                info!(?timeout, "timeout elapsed; cancelling running scripts");
                supervisor.cancel_all();
            }
        });
    }

    let total = launches.len() + failed;
    for launch in launches {
        let identity = launch.identity().clone();
        let result = launch.await;
        if !result.is_success() {
            failed += 1;
        }
        println!("== {identity}\n{}", result.summary());
    }

    if failed > 0 {
        bail!("{failed} of {total} scripts did not succeed");
    }
    Ok(())
}

/// Simple dry-run output: print the interpreter and resolved scripts.
fn print_dry_run(cfg: &ConfigFile, command: &ResolvedCommand, args: &CliArgs) {
    println!("scriptvisor dry-run");
    println!(
        "  supervisor.escalation_unit = {:?}",
        cfg.supervisor.escalation_unit
    );
    println!(
        "  supervisor.event_capacity = {}",
        cfg.supervisor.event_capacity
    );
    println!("  interpreter = {command}");
    println!();

    println!("scripts ({}):", args.scripts.len());
    for script in &args.scripts {
        let path = types::surface_path(script);
        let identity = ScriptId::resolve(&path);
        println!("  - {identity}");
        println!("      cwd: {}", types::script_dir(&path).display());
    }

    debug!("dry-run complete (no execution)");
}
