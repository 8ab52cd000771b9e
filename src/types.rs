// src/types.rs

//! Value types shared by the registry, launcher and escalator.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Canonical identity of a script.
///
/// Two surface paths that resolve to the same file (through symlinks, `.` or
/// `..` segments, or a relative path from the current directory) produce the
/// same `ScriptId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(PathBuf);

impl ScriptId {
    /// Resolve `path` into its canonical identity.
    ///
    /// Symlinks are resolved when the file exists. For paths that cannot be
    /// canonicalized (e.g. the file is missing) we fall back to a lexically
    /// normalized absolute path, so the identity is still stable.
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match path.canonicalize() {
            Ok(canonical) => Self(canonical),
            Err(_) => Self(normalize_lexically(&absolute(path))),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// The path a script is run by: absolute, but with symlinks left in place.
///
/// The process sees this path as its argument and runs in its directory, so a
/// script reached through a link behaves as if started from the link.
pub fn surface_path(path: impl AsRef<Path>) -> PathBuf {
    absolute(path.as_ref())
}

/// Working directory for a script started as `path`.
pub fn script_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("/"),
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ScriptId {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Escalation level of a running process.
///
/// Ordered so that `Running < Interrupted < Terminated < Killed`; the
/// registry only ever moves a handle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Running,
    Interrupted,
    Terminated,
    Killed,
}

impl Stage {
    /// The next stage in the escalation ladder, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Running => Some(Stage::Interrupted),
            Stage::Interrupted => Some(Stage::Terminated),
            Stage::Terminated => Some(Stage::Killed),
            Stage::Killed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Running => "running",
            Stage::Interrupted => "interrupted",
            Stage::Terminated => "terminated",
            Stage::Killed => "killed",
        };
        f.write_str(s)
    }
}

/// Outcome of one launch, delivered exactly once to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Exit code 0. `output` is stdout with surrounding whitespace trimmed.
    Success { output: String },
    /// Non-zero exit, including processes killed by a signal.
    ///
    /// For signal deaths `signal` is set and `exit_code` is `128 + signal`.
    Failure {
        exit_code: i32,
        signal: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The process could not be started at all.
    LaunchError { reason: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Exit code for `Failure`, `Some(0)` for `Success`, `None` otherwise.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionResult::Success { .. } => Some(0),
            ExecutionResult::Failure { exit_code, .. } => Some(*exit_code),
            ExecutionResult::LaunchError { .. } => None,
        }
    }

    /// Human-readable message for presentation layers.
    ///
    /// Failures list stderr before stdout, each block only when non-empty.
    pub fn summary(&self) -> String {
        match self {
            ExecutionResult::Success { output } => output.clone(),
            ExecutionResult::Failure {
                exit_code,
                signal,
                stdout,
                stderr,
            } => {
                let mut message = match signal {
                    Some(sig) => format!("script was killed by signal {sig} (status {exit_code})."),
                    None => format!("script exited with status {exit_code}."),
                };
                if !stderr.is_empty() {
                    message.push_str("\n\nerrors:\n");
                    message.push_str(stderr);
                }
                if !stdout.is_empty() {
                    message.push_str("\n\noutput:\n");
                    message.push_str(stdout);
                }
                message
            }
            ExecutionResult::LaunchError { reason } => {
                format!("could not start process: {reason}")
            }
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
