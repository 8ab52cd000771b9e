// src/exec/launcher.rs

//! Spawning, supervising and reaping one script process.

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::cancel::{DeferredTasks, LaunchKey};
use crate::errors::Result;
use crate::exec::command::ResolvedCommand;
use crate::exec::drain::{self, Stream};
use crate::exec::signal::{self, Signal};
use crate::registry::{ProcessHandle, Registry};
use crate::types::{ExecutionResult, ScriptId};

/// Pending result of one launch.
///
/// Resolves exactly once, after the process has exited and both of its
/// output streams have been drained.
#[derive(Debug)]
pub struct Launch {
    identity: ScriptId,
    rx: oneshot::Receiver<ExecutionResult>,
}

impl Launch {
    fn resolved(identity: ScriptId, result: ExecutionResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { identity, rx }
    }

    pub fn identity(&self) -> &ScriptId {
        &self.identity
    }
}

impl Future for Launch {
    type Output = ExecutionResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| {
            res.unwrap_or_else(|_| ExecutionResult::LaunchError {
                reason: "supervisor task ended before reporting a result".to_string(),
            })
        })
    }
}

#[derive(Debug)]
pub struct Launcher {
    registry: Arc<Registry>,
    deferred: Arc<DeferredTasks<LaunchKey>>,
    next_launch_id: AtomicU64,
}

impl Launcher {
    pub fn new(registry: Arc<Registry>, deferred: Arc<DeferredTasks<LaunchKey>>) -> Self {
        Self {
            registry,
            deferred,
            next_launch_id: AtomicU64::new(1),
        }
    }

    /// Start `command` on `script` under `identity`.
    ///
    /// `script` is the path the process is started as; `identity` is its
    /// canonical form and the registry key.
    ///
    /// Must be called from within a Tokio runtime. Fails immediately with
    /// `AlreadyRunning` if the script has a live process (or a launch of it
    /// is in flight); nothing is spawned in that case. A process that cannot
    /// be started is never registered and resolves to `LaunchError`.
    pub fn launch(
        &self,
        identity: ScriptId,
        script: &Path,
        command: &ResolvedCommand,
    ) -> Result<Launch> {
        let reservation = self.registry.reserve(&identity)?;

        info!(
            script = %identity,
            path = %script.display(),
            cmd = %command,
            "starting script process"
        );

        let mut child = match command.to_command(script).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    script = %identity,
                    program = %command.program().to_string_lossy(),
                    error = %e,
                    "failed to spawn script process"
                );
                drop(reservation);
                return Ok(Launch::resolved(
                    identity,
                    ExecutionResult::LaunchError {
                        reason: e.to_string(),
                    },
                ));
            }
        };

        let launch_id = self.next_launch_id.fetch_add(1, Ordering::Relaxed);
        let pid = child.id().unwrap_or_default();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let handle = ProcessHandle::new(identity.clone(), launch_id, pid, signal_tx);
        let started_at = handle.started_at();
        reservation.commit(handle);

        debug!(script = %identity, launch_id, pid, "script process registered");

        let stdout = drain::spawn_drain(child.stdout.take(), Stream::Stdout, identity.clone());
        let stderr = drain::spawn_drain(child.stderr.take(), Stream::Stderr, identity.clone());

        let (result_tx, result_rx) = oneshot::channel();
        let registry = Arc::clone(&self.registry);
        let deferred = Arc::clone(&self.deferred);
        let task_identity = identity.clone();

        tokio::spawn(async move {
            let identity = task_identity;
            let status = wait_for_exit(&mut child, signal_rx, &identity).await;

            // Exit observed: this is the one place entries are removed.
            registry.remove_launch(&identity, launch_id);
            deferred.cancel(&(identity.clone(), launch_id));

            let stdout = drain::collect(stdout, Stream::Stdout, &identity).await;
            let stderr = drain::collect(stderr, Stream::Stderr, &identity).await;

            let result = match status {
                Ok(status) => result_from_status(status, stdout, stderr),
                Err(e) => {
                    error!(script = %identity, launch_id, error = %e, "failed waiting for script process");
                    ExecutionResult::Failure {
                        exit_code: -1,
                        signal: None,
                        stdout,
                        stderr,
                    }
                }
            };

            let elapsed_ms = started_at
                .elapsed()
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default();
            info!(
                script = %identity,
                launch_id,
                elapsed_ms,
                exit_code = result.exit_code().unwrap_or(-1),
                success = result.is_success(),
                "script process exited"
            );

            if result_tx.send(result).is_err() {
                debug!(script = %identity, launch_id, "launch result dropped by caller");
            }
        });

        Ok(Launch {
            identity,
            rx: result_rx,
        })
    }
}

/// Wait for the child to exit while delivering any signals requested through
/// its handle. Requests that arrive after the exit are never acted upon.
async fn wait_for_exit(
    child: &mut Child,
    mut signals: mpsc::UnboundedReceiver<Signal>,
    identity: &ScriptId,
) -> io::Result<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => return status,
            Some(signal) = signals.recv() => deliver(child, signal, identity),
        }
    }
}

fn deliver(child: &mut Child, signal: Signal, identity: &ScriptId) {
    let Some(pid) = child.id() else {
        debug!(script = %identity, signal = signal.name(), "child already reaped; not signalling");
        return;
    };

    match signal::send_to_group(pid, signal) {
        Ok(()) => debug!(script = %identity, pid, signal = signal.name(), "signal delivered"),
        Err(e) => {
            warn!(script = %identity, pid, signal = signal.name(), error = %e, "failed to signal process group");
            if signal == Signal::Kill {
                if let Err(e) = child.start_kill() {
                    warn!(script = %identity, pid, error = %e, "failed to kill child process");
                }
            }
        }
    }
}

fn result_from_status(status: ExitStatus, stdout: String, stderr: String) -> ExecutionResult {
    if status.success() {
        return ExecutionResult::Success {
            output: stdout.trim().to_string(),
        };
    }

    let signal = terminating_signal(&status);
    let exit_code = status
        .code()
        .or_else(|| signal.map(|sig| 128 + sig))
        .unwrap_or(-1);

    ExecutionResult::Failure {
        exit_code,
        signal,
        stdout,
        stderr,
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
