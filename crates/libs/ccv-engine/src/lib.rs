//! Bounded-concurrency compile job engine.
//!
//! Validates a corpus by compiling every source in its own job while keeping
//! the number of simultaneously running compilers under a ceiling.
//!
//! - [`scheduler`]: admits any number of tasks, runs at most `K` at once
//! - [`compiler`]: one external compiler run per artifact
//! - [`orchestrator`]: one job per source, results in completion order
//! - [`results`]: the per-run record collection
//! - [`observer`]: progress notifications
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ccv_config::CompilerConfig;
//! use ccv_engine::{
//!     compiler::CommandCompiler, orchestrator::Orchestrator, scheduler::Scheduler,
//!     source::SourceUnit,
//! };
//! use ccv_io::artifact::ArtifactWriter;
//!
//! #[tokio::main]
//! async fn main() {
//!     let artifacts = ArtifactWriter::prepare("tmp", false).await.unwrap();
//!     let orchestrator = Orchestrator::new(
//!         Scheduler::new(9),
//!         Arc::new(CommandCompiler::new(CompilerConfig::default())),
//!         artifacts,
//!     );
//!
//!     let results = orchestrator
//!         .check_units(vec![
//!             SourceUnit::new("/corpus/a.cpp", "int main(){return 0;}"),
//!             SourceUnit::new("/corpus/b.cpp", "int main(){return "),
//!         ])
//!         .await;
//!
//!     for record in &results {
//!         println!("{:?} {}", record.source_path, record.success());
//!     }
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod job;
pub mod observer;
pub mod orchestrator;
pub mod outcome;
pub mod prelude;
pub mod results;
pub mod scheduler;
pub mod source;
