use std::process::Command;

use tracing::debug;

use crate::error::{ExecutionError, QueryError};
use crate::job::QueueSnapshot;

/// Queue query tool. Must be on the exporter's `$PATH`.
pub const SQUEUE: &str = "squeue";

/// Run `squeue --json` and hand back its raw stdout.
///
/// `Command::output` drains stdout in full and waits on the child on every
/// path, so no zombie is left behind when the caller bails afterwards.
/// There is no timeout: a hanging squeue hangs the scrape, and the
/// monitoring system's scrape deadline is the outer bound.
pub fn fetch() -> Result<Vec<u8>, ExecutionError> {
    let output = Command::new(SQUEUE)
        .arg("--json")
        .output()
        .map_err(|source| ExecutionError::Launch {
            command: SQUEUE.to_owned(),
            source,
        })?;
    if !output.status.success() {
        return Err(ExecutionError::NonZeroExit {
            command: SQUEUE.to_owned(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    debug!(bytes = output.stdout.len(), "read squeue output");
    Ok(output.stdout)
}

impl QueueSnapshot {
    /// Query the live job queue: one squeue invocation, one decode. Every
    /// call starts from scratch, nothing is cached across calls.
    pub fn query() -> Result<Self, QueryError> {
        let raw = fetch()?;
        Ok(Self::parse(&raw)?)
    }
}
