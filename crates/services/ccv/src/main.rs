//! Compile Corpus Validator (ccv)
//!
//! Compiles every source file found under the configured source directory,
//! with a bounded number of compiler processes running at once, and writes a
//! report saying which sources compiled.
//!
//! Each source is copied to a uniquely named artifact in the scratch
//! directory before it is compiled, so identical sources never collide.
//!
//! Settings are read from `ccv.toml` in the working directory, or from the
//! file named by `CCV_CONFIG`. The only command-line argument is the compile
//! time limit in seconds.

mod cli;
mod commands;
mod config;
mod console;
mod discovery;
mod error;
mod prelude;
mod report;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::handle_check;
use crate::config::load_config;
use crate::prelude::*;

/// Main entry point for the compile validator.
///
/// ```bash
/// # Compile everything under ./assets with a 10 second limit
/// ccv
///
/// # Same run with a 30 second limit
/// ccv 30
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccv=info,ccv_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.time_limit)?;
    handle_check(config).await
}
