//! External solver process
//!
//! The solver program reads one relaxation as JSON on stdin and prints a
//! [`Solution`] as JSON on stdout. A nonzero exit status, or a solver that
//! exits before reading all of its input, is a failed solve.

use super::{Relaxation, Solution};
use crate::error::{SdpError, SdpResult};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Solver invoked as a child process
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSolver {
    name: String,
    command: String,
    args: Vec<String>,
}

impl ExternalSolver {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn failed(&self, reason: impl Into<String>) -> SdpError {
        SdpError::SolverFailed {
            solver: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Run the solver on `relaxation` and parse its solution
    pub fn run(&self, relaxation: &Relaxation) -> SdpResult<Solution> {
        let input = serde_json::to_vec(relaxation)?;
        debug!("Executing: {} {:?} ({} bytes in)", self.command, self.args, input.len());

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SdpError::command_failed(&self.command, e))?;

        // Feed stdin from a second thread while this one drains stdout and
        // stderr, so neither side blocks on a full pipe.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(|| match stdin {
                Some(mut stdin) => stdin.write_all(&input),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output.map_err(|e| SdpError::command_failed(&self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!(
                "exit status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(self.failed(format!("stopped reading the relaxation: {}", e)))
            }
            Err(_) => return Err(self.failed("stdin writer panicked")),
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| self.failed(format!("unreadable solution: {}", e)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::algebra::bosonic_substitutions;
    use crate::relaxation::moment::standard_basis;
    use crate::relaxation::{ConstraintSet, MomentBlock, RelaxationLevel};

    fn relaxation() -> Relaxation {
        Relaxation::new(
            1,
            RelaxationLevel::Level(1),
            bosonic_substitutions(1),
            vec![],
            ConstraintSet::default(),
        )
    }

    fn shell(script: &str) -> ExternalSolver {
        ExternalSolver::new("sh", "sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn parses_solution_from_stdout() {
        let solver = shell(
            r#"cat >/dev/null; echo '{"primal":-1.5,"dual":-1.5,"x_mat":[],"y_mat":[]}'"#,
        );
        let solution = solver.run(&relaxation()).unwrap();
        assert_eq!(solution.primal, -1.5);
        assert!(solution.moments.is_empty());
    }

    #[test]
    fn nonzero_exit_is_failure() {
        let err = shell("cat >/dev/null; echo diverged >&2; exit 3")
            .run(&relaxation())
            .unwrap_err();
        assert!(matches!(err, SdpError::SolverFailed { .. }));
        assert!(err.to_string().contains("diverged"));
        assert!(err.is_retryable());
    }

    #[test]
    fn garbage_output_is_failure() {
        let err = shell("cat >/dev/null; echo not-json")
            .run(&relaxation())
            .unwrap_err();
        assert!(matches!(err, SdpError::SolverFailed { .. }));
    }

    #[test]
    fn missing_program() {
        let solver = ExternalSolver::new("ghost", "/nonexistent/solver-binary", vec![]);
        let err = solver.run(&relaxation()).unwrap_err();
        assert!(matches!(err, SdpError::CommandFailed { .. }));
    }

    /// Level-2 relaxation on six modes, far larger than a pipe buffer
    fn large_relaxation() -> Relaxation {
        let subs = bosonic_substitutions(6);
        let block = MomentBlock::generate(standard_basis(6, 2, &subs), &subs);
        Relaxation::new(
            6,
            RelaxationLevel::Level(2),
            subs,
            vec![block],
            ConstraintSet::default(),
        )
    }

    #[test]
    fn early_exit_reports_stderr() {
        let relaxation = large_relaxation();
        assert!(serde_json::to_vec(&relaxation).unwrap().len() > 1 << 17);

        let err = shell("echo bad-input >&2; exit 2")
            .run(&relaxation)
            .unwrap_err();
        assert!(matches!(err, SdpError::SolverFailed { .. }));
        assert!(err.to_string().contains("bad-input"));
        assert!(err.is_retryable());
    }

    #[test]
    fn exit_zero_without_reading_is_failure() {
        let err = shell(r#"echo '{"primal":0,"dual":0,"x_mat":[],"y_mat":[]}'"#)
            .run(&large_relaxation())
            .unwrap_err();
        assert!(matches!(err, SdpError::SolverFailed { .. }));
    }

    #[test]
    fn large_payload_echoed_while_reading() {
        // stderr fills while stdin is still being written
        let solver = shell(
            r#"cat >&2; echo '{"primal":-0.5,"dual":-0.5,"x_mat":[],"y_mat":[]}'"#,
        );
        let solution = solver.run(&large_relaxation()).unwrap();
        assert_eq!(solution.primal, -0.5);
    }
}
