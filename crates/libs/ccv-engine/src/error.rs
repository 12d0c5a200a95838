//! Engine error types.

use tokio::task::JoinError;

/// Errors raised while running a single compile job.
///
/// None of these abort a run: the orchestrator turns them into a failing
/// record for the affected source.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Reading a source or writing its artifact failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// The compiler process could not be spawned or observed.
    #[error(transparent)]
    Process(#[from] ccv_io::process::ProcessError),

    /// The job panicked while running.
    #[error("Job panicked - {0}")]
    TaskPanicked(String),

    /// The job was cancelled by the runtime before it settled.
    #[error("Job was cancelled")]
    TaskCancelled,

    /// The scheduler no longer accepts jobs.
    #[error("Scheduler is closed")]
    SchedulerClosed,
}

impl From<JoinError> for Error {
    fn from(err: JoinError) -> Self {
        if err.is_cancelled() {
            return Error::TaskCancelled;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("unknown panic payload"));
        Error::TaskPanicked(message)
    }
}
