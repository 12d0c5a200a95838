//! Process execution and scratch-file management for the CCV compile validator.
//!
//! Provides utilities for spawning external processes, capturing their output
//! as a single value with optional timeout handling, and materializing source
//! content into uniquely named files for those processes to read.
//!
//! # Usage
//!
//! ```rust
//! use ccv_io::runner::Runner;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::new("echo", vec!["Hello, World!"]);
//!     let output = runner.run(None).await.unwrap();
//!
//!     assert!(output.success());
//!     assert_eq!(output.combined_output(), "Hello, World!\n");
//! }
//! ```

pub mod artifact;
pub mod process;
pub mod runner;
