//! Process spawn + wait, with per-stream pipe capture.
//!
//! ```text
//!    (none) -- spawn --> Running -- wait_sync --> Exited(code) | Crashed | Unknown
//! ```

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Closed enum of process outcomes. Values match the CLI exit codes in §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcessResult {
    Success = 0,
    Failed = 1,
    FailedTryAgain = 2,
    Crash = 3,
    NotExistent = 4,
    Running = 5,
    Unknown = 6,
}

impl ProcessResult {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, ProcessResult::Success)
    }
}

/// Which standard streams to capture through a pipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

/// A running child process plus whichever pipes were requested captured.
pub struct Spawn {
    child: Child,
    capture: CaptureOptions,
}

/// The fully drained contents of each captured pipe, indexed
/// `[stdin, stdout, stderr]` (stdin is always empty: it's a write pipe).
#[derive(Debug)]
pub struct WaitOutcome {
    pub result: ProcessResult,
    pub streams: [Vec<u8>; 3],
}

/// Spawns `program` with `argv` and `envp`, wiring up pipes for whichever
/// streams `capture` names. `envp` fully replaces the child's environment
/// when non-empty; pass an empty map to inherit the caller's environment
/// untouched, per §6.
pub fn spawn(
    program: &Path,
    argv: &[String],
    envp: &[(String, String)],
    capture: CaptureOptions,
) -> std::io::Result<Spawn> {
    let mut command = Command::new(program);
    command.args(argv);

    if !envp.is_empty() {
        command.env_clear();
        for (key, value) in envp {
            command.env(key, value);
        }
    }

    command.stdin(if capture.stdin { Stdio::piped() } else { Stdio::inherit() });
    command.stdout(if capture.stdout { Stdio::piped() } else { Stdio::inherit() });
    command.stderr(if capture.stderr { Stdio::piped() } else { Stdio::inherit() });

    let child = command.spawn()?;
    Ok(Spawn { child, capture })
}

/// Drains captured pipes first (required on Windows to avoid deadlocking a
/// child with a full pipe; harmless and still correct on POSIX), then waits
/// for the process and maps its exit status, then closes the pipe handles
/// (dropped with the `Child`).
pub fn wait_sync(spawn: Spawn) -> std::io::Result<WaitOutcome> {
    let Spawn { mut child, capture } = spawn;

    let mut streams: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    if capture.stdout {
        if let Some(mut out) = child.stdout.take() {
            out.read_to_end(&mut streams[1])?;
        }
    }
    if capture.stderr {
        if let Some(mut err) = child.stderr.take() {
            err.read_to_end(&mut streams[2])?;
        }
    }

    let status = child.wait()?;
    let result = map_exit_status(&status);

    Ok(WaitOutcome { result, streams })
}

#[cfg(unix)]
fn map_exit_status(status: &std::process::ExitStatus) -> ProcessResult {
    use std::os::unix::process::ExitStatusExt;
    if let Some(_signal) = status.signal() {
        return ProcessResult::Crash;
    }
    match status.code() {
        Some(0) => ProcessResult::Success,
        Some(_) => ProcessResult::Failed,
        None => ProcessResult::Unknown,
    }
}

#[cfg(windows)]
fn map_exit_status(status: &std::process::ExitStatus) -> ProcessResult {
    match status.code() {
        Some(0) => ProcessResult::Success,
        Some(code) if (code as u32) >= 0x8000_0000 => ProcessResult::Crash,
        Some(_) => ProcessResult::Failed,
        None => ProcessResult::Unknown,
    }
}

/// Waits on every spawn in `spawns`, in the same order they appear (FIFO
/// join order, matching spawn order — §5's ordering guarantee), collecting
/// every outcome even after a failure so siblings are always joined.
pub fn wait_all(spawns: Vec<Spawn>) -> std::io::Result<Vec<WaitOutcome>> {
    spawns.into_iter().map(wait_sync).collect()
}

/// True if every outcome in `outcomes` succeeded.
#[must_use]
pub fn all_succeeded(outcomes: &[WaitOutcome]) -> bool {
    outcomes.iter().all(|o| o.result.is_success())
}

/// The distinct non-success results observed, for diagnostics.
#[must_use]
pub fn failure_kinds(outcomes: &[WaitOutcome]) -> HashSet<ProcessResult> {
    outcomes
        .iter()
        .filter(|o| !o.result.is_success())
        .map(|o| o.result)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn spawn_capture_composition() {
        let spawn = spawn(
            Path::new("/bin/sh"),
            &["-c".to_string(), "printf hello".to_string()],
            &[],
            CaptureOptions {
                stdin: false,
                stdout: true,
                stderr: true,
            },
        )
        .expect("spawn /bin/sh");

        let outcome = wait_sync(spawn).expect("wait");
        assert_eq!(outcome.result, ProcessResult::Success);
        assert_eq!(outcome.streams[1], b"hello");
        assert!(outcome.streams[2].is_empty());
    }

    #[test]
    fn nonzero_exit_maps_to_failed() {
        let spawn = spawn(
            Path::new("/bin/sh"),
            &["-c".to_string(), "exit 7".to_string()],
            &[],
            CaptureOptions::default(),
        )
        .expect("spawn /bin/sh");
        let outcome = wait_sync(spawn).expect("wait");
        assert_eq!(outcome.result, ProcessResult::Failed);
    }
}
