//! Compiler invocation settings.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// How the external compiler is invoked for every artifact.
///
/// The resulting command line is always
/// `<program> <artifact> -o <output_sink> <warning_flags...> -std=<standard>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable, looked up in `PATH` when not absolute.
    pub program: String,
    /// Where the compiler writes its output. Discarded by default.
    pub output_sink: String,
    /// Warning flags passed to every invocation.
    pub warning_flags: Vec<String>,
    /// Language standard passed as `-std=<standard>`.
    pub standard: String,
    /// Per-invocation time limit in seconds. The CLI argument overrides it.
    pub time_limit_secs: u64,
    /// Kill invocations that exceed the time limit and record them as timed out.
    /// When false the limit is informational only.
    pub enforce_time_limit: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: String::from("g++"),
            output_sink: String::from("/dev/null"),
            warning_flags: vec![String::from("-Wall"), String::from("-Wextra")],
            standard: String::from("c++14"),
            time_limit_secs: 10,
            enforce_time_limit: true,
        }
    }
}

impl CompilerConfig {
    /// Argument list for compiling `artifact`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ccv_config::CompilerConfig;
    /// use std::path::Path;
    ///
    /// let args = CompilerConfig::default().arguments(Path::new("/tmp/a.cpp"));
    /// assert_eq!(args, ["/tmp/a.cpp", "-o", "/dev/null", "-Wall", "-Wextra", "-std=c++14"]);
    /// ```
    pub fn arguments(&self, artifact: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.warning_flags.len() + 4);
        args.push(artifact.to_string_lossy().into_owned());
        args.push(String::from("-o"));
        args.push(self.output_sink.clone());
        args.extend(self.warning_flags.iter().cloned());
        if !self.standard.is_empty() {
            args.push(format!("-std={}", self.standard));
        }
        args
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// The limit to enforce on each invocation, if any.
    pub fn enforced_time_limit(&self) -> Option<Duration> {
        self.enforce_time_limit.then(|| self.time_limit())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(Error::InvalidValue {
                key: "compiler.program",
                reason: String::from("must not be empty"),
            });
        }
        if self.enforce_time_limit && self.time_limit_secs == 0 {
            return Err(Error::InvalidValue {
                key: "compiler.time_limit_secs",
                reason: String::from("must be at least 1 when the limit is enforced"),
            });
        }
        Ok(())
    }
}
