//! A single compile job: one source unit, one artifact, one compiler run.

use std::path::PathBuf;

use ccv_io::artifact::ArtifactWriter;
use tracing::debug;
use uuid::Uuid;

use crate::compiler::Compiler;
use crate::outcome::CompilationOutcome;
use crate::prelude::*;
use crate::results::ResultRecord;
use crate::source::SourceUnit;

#[derive(Debug)]
pub struct CompilationJob {
    /// Fresh per job, only used to name the artifact.
    pub id: Uuid,
    pub source: SourceUnit,
    /// Isolated copy of the source handed to the compiler.
    pub artifact: PathBuf,
}

impl CompilationJob {
    /// Create the job and materialize its artifact.
    ///
    /// The artifact is fully written once this returns.
    pub async fn create(source: SourceUnit, artifacts: &ArtifactWriter) -> Result<Self> {
        let id = Uuid::new_v4();
        let artifact = artifacts
            .write_artifact_as(id, &source.content, &source.extension)
            .await?;
        debug!("Job {id} for {:?} uses artifact {:?}", source.path, artifact);
        Ok(Self {
            id,
            source,
            artifact,
        })
    }

    pub async fn compile(&self, compiler: &dyn Compiler) -> Result<CompilationOutcome> {
        compiler.invoke(&self.artifact).await
    }

    /// Record keyed by the original source path, never the artifact path.
    pub fn into_record(self, outcome: CompilationOutcome) -> ResultRecord {
        ResultRecord {
            source: self.source.text(),
            source_path: self.source.path,
            outcome,
        }
    }
}
