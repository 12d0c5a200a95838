//! Configuration management for the CCV compile validator.
//!
//! Provides the TOML file model ([`CcvUserConfig`]) and the resolved
//! configuration ([`CcvConfig`]) consumed by the engine and the CLI.
//!
//! # Usage
//!
//! ```rust
//! use ccv_config::{CcvConfig, CcvUserConfig};
//! use std::path::Path;
//!
//! let user_config = CcvUserConfig::from_toml(
//!     r#"
//!     [compiler]
//!     standard = "c++17"
//!     "#,
//! )
//! .unwrap();
//!
//! let config = CcvConfig::from_user_config(user_config, Path::new("/work")).unwrap();
//! assert_eq!(config.source_dir, Path::new("/work/assets"));
//! ```

pub mod ccv_config;
pub mod compiler_config;
pub mod engine_config;
pub mod error;
pub mod prelude;

pub use ccv_config::{CcvConfig, CcvUserConfig, ReportFormat};
pub use compiler_config::CompilerConfig;
pub use engine_config::{EngineConfig, MAX_ENGINE_PERMITS};
