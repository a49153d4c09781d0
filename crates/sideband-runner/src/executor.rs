//! Process-backed transport executor.

use sideband_codec::{CodecError, CodecResult, ExecutorOutput, OutputCodec, TransportExecutor};
use std::process::Command;
use tracing::{debug, trace};

/// Runs an external program once per request and captures its output.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
}

impl ProcessExecutor {
    /// Create an executor for `program` (looked up on `PATH`).
    pub fn new(program: impl Into<String>) -> Self {
        ProcessExecutor {
            program: program.into(),
        }
    }

    /// The program this executor launches.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl TransportExecutor for ProcessExecutor {
    fn execute(&mut self, args: &[String]) -> CodecResult<ExecutorOutput> {
        debug!(program = %self.program, args = %args.join(" "), "spawning executor");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| CodecError::transport(format!("failed to run {}: {}", self.program, e)))?;

        let mut codec = OutputCodec::default();
        codec.push(&output.stdout);
        let stdout = codec.drain_lines();
        trace!(lines = stdout.len(), status = ?output.status.code(), "executor finished");

        Ok(ExecutorOutput {
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
