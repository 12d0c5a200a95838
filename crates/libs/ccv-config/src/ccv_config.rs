//! Core configuration types for the CCV compile validator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{compiler_config::CompilerConfig, engine_config::EngineConfig, prelude::*};

/// Input and output locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the corpus, walked recursively.
    pub source_dir: PathBuf,
    /// Where artifacts are written.
    pub scratch_dir: PathBuf,
    /// Where the final report is written.
    pub report: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("assets"),
            scratch_dir: PathBuf::from("tmp"),
            report: PathBuf::from("report.html"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Remove leftovers of previous runs before starting.
    pub clear_on_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Only pick up files with these extensions. Every regular file when empty.
    pub extensions: Vec<String>,
}

/// Report document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

/// User-provided configuration, usually loaded from `ccv.toml`.
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcvUserConfig {
    pub paths: PathsConfig,
    pub scratch: ScratchConfig,
    pub compiler: CompilerConfig,
    pub engine: EngineConfig,
    pub discovery: DiscoveryConfig,
    pub report: ReportConfig,
}

/// Validated configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcvConfig {
    pub source_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
    pub clear_scratch: bool,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    pub compiler: CompilerConfig,
    pub engine: EngineConfig,
}

impl CcvUserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        info!("Loading configuration from {:?}", file_path);
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}

impl CcvConfig {
    /// Validate a user configuration and resolve its paths against `base_dir`.
    pub fn from_user_config(config: CcvUserConfig, base_dir: &Path) -> Result<Self> {
        config.compiler.validate()?;
        config.engine.validate()?;

        Ok(Self {
            source_dir: base_dir.join(config.paths.source_dir),
            scratch_dir: base_dir.join(config.paths.scratch_dir),
            report_path: base_dir.join(config.paths.report),
            report_format: config.report.format,
            clear_scratch: config.scratch.clear_on_start,
            extensions: config
                .discovery
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            compiler: config.compiler,
            engine: config.engine,
        })
    }

    /// Override the compiler time limit, as done by the CLI argument.
    pub fn with_time_limit(mut self, seconds: Option<u64>) -> Self {
        if let Some(seconds) = seconds {
            self.compiler.time_limit_secs = seconds;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn deserialize() -> Result<()> {
        let content = r#"
            # Compile validator configuration

            [paths]
            source_dir = "submissions"
            scratch_dir = "/var/tmp/ccv"
            report = "out/report.json"

            [scratch]
            clear_on_start = true

            [compiler]
            program = "clang++"
            warning_flags = ["-Wall", "-Wpedantic"]
            standard = "c++17"
            time_limit_secs = 30
            enforce_time_limit = false

            [engine]
            processors = 4
            queue_capacity = 128

            [discovery]
            extensions = [".CPP", "cc", ""]

            [report]
            format = "json"
        "#;

        let user_config = CcvUserConfig::from_toml(content)?;
        assert_eq!(user_config.compiler.output_sink, "/dev/null");
        assert_eq!(user_config.engine.concurrency, None);

        let config = CcvConfig::from_user_config(user_config, Path::new("/work"))?;
        assert_eq!(config.source_dir, Path::new("/work/submissions"));
        assert_eq!(config.scratch_dir, Path::new("/var/tmp/ccv"));
        assert_eq!(config.report_path, Path::new("/work/out/report.json"));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert!(config.clear_scratch);
        assert_eq!(config.extensions, ["cpp", "cc"]);
        assert_eq!(config.compiler.program, "clang++");
        assert_eq!(config.compiler.enforced_time_limit(), None);
        assert_eq!(config.engine.concurrency_limit(1), 9);
        assert_eq!(config.engine.queue_capacity, Some(128));
        Ok(())
    }

    #[test]
    fn empty_file_gives_defaults() -> Result<()> {
        let config = CcvConfig::from_user_config(CcvUserConfig::from_toml("")?, Path::new("/w"))?;

        assert_eq!(config.source_dir, Path::new("/w/assets"));
        assert_eq!(config.scratch_dir, Path::new("/w/tmp"));
        assert_eq!(config.report_path, Path::new("/w/report.html"));
        assert_eq!(config.report_format, ReportFormat::Html);
        assert!(!config.clear_scratch);
        assert!(config.extensions.is_empty());
        assert_eq!(config.compiler, CompilerConfig::default());
        assert_eq!(config.engine, EngineConfig::default());
        Ok(())
    }

    #[test]
    fn time_limit_override() -> Result<()> {
        let config = CcvConfig::from_user_config(CcvUserConfig::default(), Path::new("/w"))?;

        assert_eq!(config.clone().with_time_limit(None).compiler.time_limit_secs, 10);
        assert_eq!(config.with_time_limit(Some(3)).compiler.time_limit_secs, 3);
        Ok(())
    }

    #[test]
    fn huge_queue_capacity_is_rejected() -> Result<()> {
        let user_config =
            CcvUserConfig::from_toml("[engine]\nqueue_capacity = 9223372036854775807\n")?;

        let result = CcvConfig::from_user_config(user_config, Path::new("/w"));
        assert!(matches!(
            result,
            Err(Error::InvalidValue {
                key: "engine.queue_capacity",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = CcvUserConfig::from_toml("[report]\nformat = \"pdf\"\n");
        assert!(matches!(result, Err(Error::Deserialization(_))));
    }

    #[test]
    fn from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ccv.toml");
        std::fs::write(&path, "[engine]\nconcurrency = 2\n")?;

        let config = CcvUserConfig::from_file(&path)?;
        assert_eq!(config.engine.concurrency, Some(2));

        assert!(matches!(
            CcvUserConfig::from_file(&dir.path().join("missing.toml")),
            Err(Error::IO(_))
        ));
        Ok(())
    }
}
