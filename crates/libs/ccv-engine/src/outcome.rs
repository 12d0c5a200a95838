//! Per-job compilation outcome.

use std::{fmt, time::Duration};

use ccv_io::process::ProcessOutput;
use serde::Serialize;

/// Exit code recorded when the process gave none (killed by a signal,
/// timed out) or never ran.
pub const NO_EXIT_CODE: i32 = -1;

/// How an outcome came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The compiler ran and exited.
    Compiled,
    /// The compiler exceeded the enforced time limit and was killed.
    TimedOut,
    /// The job failed before the compiler could report (I/O, spawn, panic).
    JobError,
}

/// Verdict for one compilation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationOutcome {
    pub success: bool,
    /// Everything the compiler printed on stdout and stderr.
    pub diagnostics: String,
    pub exit_code: i32,
    pub kind: OutcomeKind,
}

impl CompilationOutcome {
    /// Outcome of a compiler that exited on its own.
    pub fn compiled(exit_code: Option<i32>, diagnostics: String) -> Self {
        let exit_code = exit_code.unwrap_or(NO_EXIT_CODE);
        Self {
            success: exit_code == 0,
            diagnostics,
            exit_code,
            kind: OutcomeKind::Compiled,
        }
    }

    /// Outcome of a compiler killed at the time limit. Whatever it printed
    /// before that is kept ahead of the timeout notice.
    pub fn timed_out(limit: Duration, partial_output: String) -> Self {
        let mut diagnostics = partial_output;
        if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
            diagnostics.push('\n');
        }
        diagnostics.push_str(&format!(
            "Compilation exceeded the time limit of {} seconds and was killed",
            limit.as_secs()
        ));
        Self {
            success: false,
            diagnostics,
            exit_code: NO_EXIT_CODE,
            kind: OutcomeKind::TimedOut,
        }
    }

    /// Synthetic failing outcome for a job that could not be carried out.
    pub fn job_error(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            diagnostics: format!("Job failed before compilation finished - {error}"),
            exit_code: NO_EXIT_CODE,
            kind: OutcomeKind::JobError,
        }
    }

    /// Interpret what the compiler process left behind.
    ///
    /// `limit` is the time limit that was enforced, used only to describe a
    /// timed out process.
    pub fn from_process(output: &ProcessOutput, limit: Option<Duration>) -> Self {
        if output.timed_out {
            return Self::timed_out(limit.unwrap_or_default(), output.combined_output());
        }
        Self::compiled(output.exit_code(), output.combined_output())
    }
}
