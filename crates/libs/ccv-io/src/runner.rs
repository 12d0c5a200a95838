//! High-level process runner.

use std::time::Duration;

use tracing::debug;

use crate::process::{ProcessError, ProcessOutput, capture_output, spawn_process};

/// A command line that can be run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    /// Command to execute.
    command: String,
    /// Command line arguments.
    args: Vec<String>,
}

impl Runner {
    /// Create a new runner with command and arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ccv_io::runner::Runner;
    ///
    /// let runner = Runner::new("ls", vec!["-la", "/tmp"]);
    /// ```
    pub fn new(command: impl Into<String>, args: Vec<impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
        }
    }

    /// Create a new runner with just a command (no arguments).
    pub fn new_without_args(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Get the full command string with arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ccv_io::runner::Runner;
    ///
    /// let runner = Runner::new("ls", vec!["-la"]);
    /// assert_eq!(runner.get_full_command(), "ls -la");
    /// ```
    pub fn get_full_command(&self) -> String {
        if self.args.is_empty() {
            return self.command.clone();
        }
        format!("{} {}", &self.command, &self.args.join(" "))
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the process until it exits (or `timeout` elapses) and return
    /// everything it produced.
    ///
    /// Spawn failures are returned as errors; a non-zero exit is not an error
    /// and is reported through the returned [`ProcessOutput`].
    pub async fn run(&self, timeout: Option<Duration>) -> Result<ProcessOutput, ProcessError> {
        debug!("Running {}", self.get_full_command());
        let child = spawn_process(&self.command, &self.args)?;
        capture_output(child, timeout).await
    }
}
