use std::sync::Arc;

use ccv_config::CcvConfig;
use ccv_engine::orchestrator::Orchestrator;
use ccv_io::artifact::ArtifactWriter;
use chrono::Utc;
use tracing::info;

use crate::console::ConsoleObserver;
use crate::discovery::discover;
use crate::prelude::*;
use crate::report::Report;

/// Compile the whole corpus and write the report.
///
/// Failing sources never fail the run. Only a missing scratch directory, an
/// unreadable source directory or an unwritable report do.
pub async fn handle_check(config: CcvConfig) -> Result<()> {
    let artifacts = ArtifactWriter::prepare(&config.scratch_dir, config.clear_scratch)
        .await
        .map_err(|source| Error::ScratchDir {
            path: config.scratch_dir.clone(),
            source,
        })?;

    let sources = discover(&config.source_dir, &config.extensions).await?;

    let orchestrator = Orchestrator::from_config(&config, artifacts)
        .with_observer(Arc::new(ConsoleObserver::new(&config.source_dir)));
    info!(
        "Running with {} concurrent jobs and a {} second time limit{}",
        orchestrator.scheduler().limit(),
        config.compiler.time_limit_secs,
        if config.compiler.enforce_time_limit {
            ""
        } else {
            " (not enforced)"
        }
    );

    let results = orchestrator.check_paths(sources).await;
    info!("{} passed, {} failed", results.passed(), results.failed());

    let report = Report::new(&config.source_dir, &results, Utc::now());
    report.write_to_file(&config.report_path, config.report_format)?;
    info!("Report written to {:?}", config.report_path);
    Ok(())
}
