//! Job orchestration.
//!
//! Turns every source into one compile job, submits all of them to the
//! [`Scheduler`] up front and stores each record as its job settles. A run:
//!
//! 1. Admits one job per source (the scheduler does all the batching)
//! 2. Once admitted, a job reads its source, writes its artifact and compiles it
//! 3. Settled records go into a fresh [`ResultCollection`] in completion order
//! 4. The collection is returned once every job has settled
//!
//! Per-job failures (unreadable source, artifact write, spawn failure, panic)
//! become a failing record for that source only. Nothing aborts a run.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use ccv_config::CcvConfig;
use ccv_io::artifact::ArtifactWriter;
use futures::{FutureExt, StreamExt, stream::FuturesUnordered};
use tracing::{error, info};

use crate::compiler::{CommandCompiler, Compiler};
use crate::job::CompilationJob;
use crate::observer::{JobObserver, NoopObserver, Progress};
use crate::prelude::*;
use crate::results::{ResultCollection, ResultRecord};
use crate::scheduler::Scheduler;
use crate::source::SourceUnit;

/// What a job starts from.
enum JobInput {
    /// Read from disk once the job is admitted.
    Path(PathBuf),
    /// Already in memory.
    Unit(SourceUnit),
}

impl JobInput {
    fn path(&self) -> &Path {
        match self {
            JobInput::Path(path) => path,
            JobInput::Unit(unit) => &unit.path,
        }
    }
}

/// Everything a job needs, shared between all jobs of an orchestrator.
#[derive(Clone)]
struct JobContext {
    compiler: Arc<dyn Compiler>,
    artifacts: ArtifactWriter,
    observer: Arc<dyn JobObserver>,
}

pub struct Orchestrator {
    scheduler: Scheduler,
    context: JobContext,
}

impl Orchestrator {
    pub fn new(
        scheduler: Scheduler,
        compiler: Arc<dyn Compiler>,
        artifacts: ArtifactWriter,
    ) -> Self {
        Self {
            scheduler,
            context: JobContext {
                compiler,
                artifacts,
                observer: Arc::new(NoopObserver),
            },
        }
    }

    /// Orchestrator running the configured compiler under the configured ceiling.
    pub fn from_config(config: &CcvConfig, artifacts: ArtifactWriter) -> Self {
        Self::new(
            Scheduler::from_config(&config.engine),
            Arc::new(CommandCompiler::new(config.compiler.clone())),
            artifacts,
        )
    }

    pub fn with_observer(mut self, observer: Arc<dyn JobObserver>) -> Self {
        self.context.observer = observer;
        self
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Check every file in `paths`. Each file is read by its own job.
    pub async fn check_paths(&self, paths: Vec<PathBuf>) -> ResultCollection {
        self.check(paths.into_iter().map(JobInput::Path).collect())
            .await
    }

    /// Check sources that are already in memory.
    pub async fn check_units(&self, units: Vec<SourceUnit>) -> ResultCollection {
        self.check(units.into_iter().map(JobInput::Unit).collect())
            .await
    }

    async fn check(&self, inputs: Vec<JobInput>) -> ResultCollection {
        let total = inputs.len();
        info!(
            "Checking {total} sources, at most {} compiling at once",
            self.scheduler.limit()
        );

        let mut results = ResultCollection::new();
        let mut progress = Progress {
            completed: 0,
            total,
        };
        let mut pending = FuturesUnordered::new();

        for input in inputs {
            let source_path = input.path().to_path_buf();
            let context = self.context.clone();

            match self.scheduler.admit(run_job(input, context)).await {
                Ok(admission) => pending.push(async move { (source_path, admission.await) }),
                Err(err) => {
                    error!("Failed to admit job for {:?} - {err}", source_path);
                    let record = ResultRecord::job_error(source_path, String::new(), err);
                    self.settle(&mut results, record, &mut progress);
                }
            }

            // Record whatever already finished so progress is reported while
            // admission is still waiting on a bounded queue.
            while let Some(Some(settled)) = pending.next().now_or_never() {
                self.settle_admission(&mut results, settled, &mut progress);
            }
        }

        while let Some(settled) = pending.next().await {
            self.settle_admission(&mut results, settled, &mut progress);
        }

        info!(
            "All {total} jobs settled: {} passed, {} failed",
            results.passed(),
            results.failed()
        );
        results
    }

    fn settle_admission(
        &self,
        results: &mut ResultCollection,
        (source_path, settled): (PathBuf, Result<ResultRecord>),
        progress: &mut Progress,
    ) {
        let record = settled.unwrap_or_else(|err| {
            error!("Job for {:?} did not settle - {err}", source_path);
            ResultRecord::job_error(source_path, String::new(), err)
        });
        self.settle(results, record, progress);
    }

    /// Counts settled jobs rather than records, since a path submitted twice
    /// keeps a single record.
    fn settle(
        &self,
        results: &mut ResultCollection,
        record: ResultRecord,
        progress: &mut Progress,
    ) {
        results.insert(record.clone());
        progress.completed += 1;
        self.context.observer.on_job_settled(&record, *progress);
    }
}

/// Body of one admitted job. Always produces a record.
async fn run_job(input: JobInput, context: JobContext) -> ResultRecord {
    let source_path = input.path().to_path_buf();
    context.observer.on_job_started(&source_path);

    let source = match input {
        JobInput::Unit(unit) => unit,
        JobInput::Path(path) => match SourceUnit::load(path).await {
            Ok(unit) => unit,
            Err(err) => {
                error!("Failed to read source {:?} - {err}", source_path);
                return ResultRecord::job_error(source_path, String::new(), err);
            }
        },
    };
    let text = source.text();

    let job = match CompilationJob::create(source, &context.artifacts).await {
        Ok(job) => job,
        Err(err) => {
            error!("Failed to write artifact for {:?} - {err}", source_path);
            return ResultRecord::job_error(source_path, text, err);
        }
    };

    match job.compile(context.compiler.as_ref()).await {
        Ok(outcome) => job.into_record(outcome),
        Err(err) => {
            error!("Failed to compile {:?} - {err}", source_path);
            ResultRecord::job_error(source_path, text, err)
        }
    }
}
