// src/exec/signal.rs

//! Signal delivery to supervised processes.
//!
//! Every child is spawned as the leader of its own process group, so signals
//! are sent to the whole group: an interpreter that forks helpers gets them
//! stopped along with it.

use std::io;

use crate::types::Stage;

/// Termination signals used by the cancellation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Soft stop (`SIGINT`); scripts may trap it to clean up.
    Interrupt,
    /// Standard stop request (`SIGTERM`).
    Terminate,
    /// Unconditional kill (`SIGKILL`).
    Kill,
}

impl Signal {
    /// Signal to send when a handle enters `stage`.
    pub fn for_stage(stage: Stage) -> Option<Signal> {
        match stage {
            Stage::Running => None,
            Stage::Interrupted => Some(Signal::Interrupt),
            Stage::Terminated => Some(Signal::Terminate),
            Stage::Killed => Some(Signal::Kill),
        }
    }

    #[cfg(unix)]
    pub fn as_raw(self) -> libc::c_int {
        match self {
            Signal::Interrupt => libc::SIGINT,
            Signal::Terminate => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Kill => "SIGKILL",
        }
    }
}

/// Send `signal` to the process group led by `pid`.
#[cfg(unix)]
pub fn send_to_group(pid: u32, signal: Signal) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // Safety: kill() is a plain syscall; a negative pid addresses the group.
    let rc = unsafe { libc::kill(-pgid, signal.as_raw()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub fn send_to_group(_pid: u32, signal: Signal) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{} is not supported on this platform", signal.name()),
    ))
}
