// src/exec/command.rs

//! The already-resolved interpreter command a script is run with.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::{Result, SupervisorError};
use crate::types::script_dir;

/// Interpreter program plus leading arguments; the script path is appended
/// as the final argument at launch time.
///
/// For `/usr/bin/env python3` the program is `/usr/bin/env` and the leading
/// argument is `python3`, so the process runs `/usr/bin/env python3 <script>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ResolvedCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Parse a whitespace-separated interpreter string such as
    /// `"/usr/bin/env python3"` or `"/opt/homebrew/bin/python3 -u"`.
    pub fn from_interpreter(interpreter: &str) -> Result<Self> {
        let mut parts = interpreter.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            SupervisorError::ConfigError("interpreter command must not be empty".to_string())
        })?;
        Ok(Self::new(program).args(parts))
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn leading_args(&self) -> &[OsString] {
        &self.args
    }

    /// Build the process for `script` as the caller named it (symlinks are
    /// not resolved): working directory is that path's directory, stdin is closed, stdout/stderr are piped, and the child
    /// leads a fresh process group with default SIGINT/SIGTERM handling.
    pub(crate) fn to_command(&self, script: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(script)
            .current_dir(script_dir(script))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            // A supervisor started in the background inherits ignored SIGINT;
            // the child must not, or the first rung of cancellation is lost.
            // Safety: setpgid() and signal() are async-signal-safe.
            unsafe {
                cmd.pre_exec(|| {
                    if libc::setpgid(0, 0) != 0 {
                        return Err(std::io::Error::last_os_error());
                    }
                    libc::signal(libc::SIGINT, libc::SIG_DFL);
                    libc::signal(libc::SIGTERM, libc::SIG_DFL);
                    Ok(())
                });
            }
        }

        cmd
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
