//! Command-line interface for the compile validator.

use clap::Parser;

/// Command-line interface for ccv.
///
/// Everything besides the time limit comes from `ccv.toml` (or the file named
/// by `CCV_CONFIG`).
#[derive(Parser, Debug)]
#[command(name = "ccv", version)]
#[command(about = "Compile every source of a corpus and write a pass/fail report")]
pub struct Cli {
    /// Compile time limit in seconds [default: 10]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub time_limit: Option<u64>,
}
