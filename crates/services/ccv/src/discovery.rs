//! Source discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::prelude::*;

/// Every regular file below `root`, sorted.
///
/// With a non-empty `extensions` list (lowercase, no dot) only files with one
/// of those extensions are kept. Symlinked files are followed, symlinked
/// directories are not. An unreadable `root` is an error; unreadable entries
/// below it are skipped with a warning.
pub async fn discover(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let mut directories = vec![root.to_path_buf()];

    while let Some(dir) = directories.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(source) if dir == root => return Err(Error::SourceDir { path: dir, source }),
            Err(err) => {
                warn!("Skipping unreadable directory {:?} - {}", dir, err);
                continue;
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!("Skipping {:?} - {}", path, err);
                    continue;
                }
            };

            let is_file = if file_type.is_dir() {
                directories.push(path);
                continue;
            } else if file_type.is_symlink() {
                tokio::fs::metadata(&path)
                    .await
                    .map(|metadata| metadata.is_file())
                    .unwrap_or(false)
            } else {
                file_type.is_file()
            };

            if is_file && matches_extension(&path, extensions) {
                sources.push(path);
            }
        }
    }

    sources.sort();
    debug!("Discovered {} sources under {:?}", sources.len(), root);
    Ok(sources)
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("b.cpp"), "int main(){}").unwrap();
        fs::write(dir.path().join("a.CPP"), "int main(){}").unwrap();
        fs::write(dir.path().join("notes.txt"), "not code").unwrap();
        fs::write(dir.path().join("nested/c.cpp"), "int main(){}").unwrap();
        fs::write(dir.path().join("nested/deeper/Makefile"), "all:").unwrap();
        dir
    }

    #[tokio::test]
    async fn finds_every_file_recursively() -> Result<()> {
        let dir = corpus();
        let sources = discover(dir.path(), &[]).await?;

        let expected: Vec<PathBuf> = [
            "a.CPP",
            "b.cpp",
            "nested/c.cpp",
            "nested/deeper/Makefile",
            "notes.txt",
        ]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
        assert_eq!(sources, expected);
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_extension() -> Result<()> {
        let dir = corpus();
        let sources = discover(dir.path(), &[String::from("cpp")]).await?;

        assert_eq!(
            sources,
            vec![
                dir.path().join("a.CPP"),
                dir.path().join("b.cpp"),
                dir.path().join("nested/c.cpp"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_directory_yields_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(discover(dir.path(), &[]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover(&dir.path().join("missing"), &[]).await;
        assert!(matches!(result, Err(Error::SourceDir { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn follows_file_links_only() -> Result<()> {
        let dir = corpus();
        std::os::unix::fs::symlink(dir.path().join("b.cpp"), dir.path().join("link.cpp"))?;
        std::os::unix::fs::symlink(dir.path().join("nested"), dir.path().join("loop"))?;

        let sources = discover(dir.path(), &[String::from("cpp")]).await?;
        assert!(sources.contains(&dir.path().join("link.cpp")));
        assert!(!sources.iter().any(|path| path.starts_with(dir.path().join("loop"))));
        Ok(())
    }
}
