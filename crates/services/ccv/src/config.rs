use std::{
    env,
    path::{Path, PathBuf},
};

use ccv_config::{CcvConfig, CcvUserConfig};

use crate::prelude::*;

/// Names an alternative configuration file.
pub const CONFIG_ENV: &str = "CCV_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "ccv.toml";

/// Resolve the run configuration from the working directory.
pub fn load_config(time_limit: Option<u64>) -> Result<CcvConfig> {
    let cwd = env::current_dir()?;
    let explicit = env::var_os(CONFIG_ENV).map(PathBuf::from);
    load_config_from(&cwd, explicit.as_deref(), time_limit)
}

/// An explicit config file must exist. Without one, `ccv.toml` in `base_dir`
/// is used when present, defaults otherwise. Relative paths resolve against
/// `base_dir`.
pub fn load_config_from(
    base_dir: &Path,
    explicit: Option<&Path>,
    time_limit: Option<u64>,
) -> Result<CcvConfig> {
    let file = match explicit {
        Some(path) => Some(base_dir.join(path)),
        None => {
            let default = base_dir.join(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    };

    let user_config = match file {
        Some(path) => CcvUserConfig::from_file(&path)?,
        None => CcvUserConfig::default(),
    };

    Ok(CcvConfig::from_user_config(user_config, base_dir)?.with_time_limit(time_limit))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_without_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_config_from(dir.path(), None, None)?;

        assert_eq!(config.source_dir, dir.path().join("assets"));
        assert_eq!(config.scratch_dir, dir.path().join("tmp"));
        assert_eq!(config.compiler.time_limit(), Duration::from_secs(10));
        Ok(())
    }

    #[test]
    fn reads_default_file_and_applies_time_limit() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[paths]\nsource_dir = \"corpus\"\n[compiler]\nprogram = \"clang++\"\n",
        )?;

        let config = load_config_from(dir.path(), None, Some(3))?;
        assert_eq!(config.source_dir, dir.path().join("corpus"));
        assert_eq!(config.compiler.program, "clang++");
        assert_eq!(config.compiler.time_limit(), Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(dir.path(), Some(Path::new("nope.toml")), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
