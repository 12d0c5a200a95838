//! Compiler invocation.
//!
//! A [`Compiler`] turns one artifact into one [`CompilationOutcome`]. The
//! default implementation, [`CommandCompiler`], spawns the configured
//! external compiler and waits for it without blocking other invocations.

use std::path::Path;

use async_trait::async_trait;
use ccv_config::CompilerConfig;
use ccv_io::runner::Runner;
use tracing::{debug, warn};

use crate::outcome::CompilationOutcome;
use crate::prelude::*;

#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile the artifact at `path` and report the verdict.
    ///
    /// A compiler that runs and rejects the source is a successful call with
    /// a failing outcome. Errors mean the compiler could not be run at all.
    async fn invoke(&self, artifact: &Path) -> Result<CompilationOutcome>;
}

/// Runs an external compiler process per artifact.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    config: CompilerConfig,
}

impl CommandCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The exact command line used for `artifact`.
    pub fn runner(&self, artifact: &Path) -> Runner {
        Runner::new(
            self.config.program.clone(),
            self.config.arguments(artifact),
        )
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    async fn invoke(&self, artifact: &Path) -> Result<CompilationOutcome> {
        let runner = self.runner(artifact);
        let limit = self.config.enforced_time_limit();

        let output = runner.run(limit).await?;
        let outcome = CompilationOutcome::from_process(&output, limit);
        if output.timed_out {
            warn!("{} timed out", runner.get_full_command());
        } else {
            debug!(
                "{} exited with {}",
                runner.get_full_command(),
                outcome.exit_code
            );
        }
        Ok(outcome)
    }
}
