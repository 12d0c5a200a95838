use std::path::{Path, PathBuf};

use ccv_engine::{
    observer::{JobObserver, Progress},
    results::ResultRecord,
};
use tracing::debug;

/// Prints one verdict line per settled source.
#[derive(Debug, Clone)]
pub struct ConsoleObserver {
    root: PathBuf,
}

impl ConsoleObserver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn verdict_line(&self, record: &ResultRecord, progress: Progress) -> String {
        let verdict = if record.success() { "PASS" } else { "FAIL" };
        format!(
            "[{}/{}] {} {}",
            progress.completed,
            progress.total,
            relative_path(&self.root, &record.source_path).display(),
            verdict
        )
    }
}

impl JobObserver for ConsoleObserver {
    fn on_job_started(&self, source_path: &Path) {
        debug!("Compiling {:?}", source_path);
    }

    fn on_job_settled(&self, record: &ResultRecord, progress: Progress) {
        println!("{}", self.verdict_line(record, progress));
    }
}

/// `path` relative to `root`, or unchanged when it lies elsewhere.
pub fn relative_path<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use ccv_engine::outcome::CompilationOutcome;

    use super::*;

    #[test]
    fn prints_relative_path_and_verdict() {
        let observer = ConsoleObserver::new("/corpus");
        let passed = ResultRecord {
            source_path: PathBuf::from("/corpus/nested/a.cpp"),
            outcome: CompilationOutcome::compiled(Some(0), String::new()),
            source: String::new(),
        };
        let failed = ResultRecord::job_error("/elsewhere/b.cpp", String::new(), "gone");
        let progress = Progress {
            completed: 2,
            total: 5,
        };

        assert_eq!(observer.verdict_line(&passed, progress), "[2/5] nested/a.cpp PASS");
        assert_eq!(
            observer.verdict_line(&failed, progress),
            "[2/5] /elsewhere/b.cpp FAIL"
        );
    }
}
