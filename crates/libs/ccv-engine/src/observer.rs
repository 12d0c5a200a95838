//! Job progress notifications.
//!
//! The orchestrator never prints. Whoever drives a run decides what to do with
//! progress by handing it a [`JobObserver`]: a console printer, a channel, or
//! nothing at all.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedSender;

use crate::results::ResultRecord;

/// How far a run has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Receives notifications as jobs start and settle.
///
/// `on_job_started` is called from the job's own task once it holds a slot,
/// so it may run concurrently for different jobs. `on_job_settled` is called
/// from the orchestrator, one job at a time, in completion order.
pub trait JobObserver: Send + Sync {
    fn on_job_started(&self, _source_path: &Path) {}

    fn on_job_settled(&self, record: &ResultRecord, progress: Progress);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl JobObserver for NoopObserver {
    fn on_job_settled(&self, _record: &ResultRecord, _progress: Progress) {}
}

/// Events emitted to channel observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The job got a slot and is about to compile.
    Started { source_path: PathBuf },
    /// The job's record has been stored.
    Settled {
        source_path: PathBuf,
        success: bool,
        progress: Progress,
    },
}

impl JobObserver for UnboundedSender<JobEvent> {
    fn on_job_started(&self, source_path: &Path) {
        let _ = self.send(JobEvent::Started {
            source_path: source_path.to_path_buf(),
        });
    }

    fn on_job_settled(&self, record: &ResultRecord, progress: Progress) {
        let _ = self.send(JobEvent::Settled {
            source_path: record.source_path.clone(),
            success: record.success(),
            progress,
        });
    }
}
