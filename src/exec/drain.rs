// src/exec/drain.rs

//! Output draining for child pipes.
//!
//! Each pipe gets its own task that reads until EOF. These run while the
//! launcher waits on the child, so a script that writes more than the OS pipe
//! buffer holds never stalls on a full pipe.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::ScriptId;

/// Which child stream a drain task reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Spawn a task that reads `reader` to EOF and yields the captured bytes.
///
/// A missing pipe yields an empty buffer. A read error ends the drain early
/// and keeps whatever was read before it.
pub fn spawn_drain<R>(reader: Option<R>, stream: Stream, identity: ScriptId) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        let Some(mut reader) = reader else {
            return buf;
        };

        match reader.read_to_end(&mut buf).await {
            Ok(n) => {
                debug!(script = %identity, stream = stream.as_str(), bytes = n, "pipe drained");
            }
            Err(e) => {
                warn!(
                    script = %identity,
                    stream = stream.as_str(),
                    bytes = buf.len(),
                    error = %e,
                    "failed reading child output; keeping partial capture"
                );
            }
        }
        buf
    })
}

/// Await a drain task, treating a panicked or aborted task as empty output.
pub async fn collect(handle: JoinHandle<Vec<u8>>, stream: Stream, identity: &ScriptId) -> String {
    match handle.await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(script = %identity, stream = stream.as_str(), error = %e, "drain task failed");
            String::new()
        }
    }
}
