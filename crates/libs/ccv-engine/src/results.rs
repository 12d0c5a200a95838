//! Result aggregation.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    slice,
};

use serde::Serialize;

use crate::outcome::CompilationOutcome;

/// The recorded verdict for one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// Original path of the source, not its artifact.
    pub source_path: PathBuf,
    pub outcome: CompilationOutcome,
    /// Source text as it was compiled.
    pub source: String,
}

impl ResultRecord {
    /// Failing record for a source whose job could not be carried out.
    pub fn job_error(
        source_path: impl Into<PathBuf>,
        source: String,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: CompilationOutcome::job_error(error),
            source,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.success
    }
}

/// Records of one run, keyed by source path.
///
/// Iteration follows completion order. Inserting a path that is already
/// present replaces its record in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCollection {
    records: Vec<ResultRecord>,
    index: HashMap<PathBuf, usize>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, returning the record it replaced if the path was known.
    pub fn insert(&mut self, record: ResultRecord) -> Option<ResultRecord> {
        match self.index.get(&record.source_path) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index
                    .insert(record.source_path.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, source_path: &Path) -> Option<&ResultRecord> {
        self.index
            .get(source_path)
            .map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.passed()
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}

impl IntoIterator for ResultCollection {
    type Item = ResultRecord;
    type IntoIter = std::vec::IntoIter<ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a ResultRecord;
    type IntoIter = slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, exit_code: i32) -> ResultRecord {
        ResultRecord {
            source_path: PathBuf::from(path),
            outcome: CompilationOutcome::compiled(Some(exit_code), String::new()),
            source: String::from("int main(){}"),
        }
    }

    #[test]
    fn keeps_completion_order() {
        let mut results = ResultCollection::new();
        assert!(results.is_empty());

        results.insert(record("/c/b.cpp", 1));
        results.insert(record("/c/a.cpp", 0));

        let order: Vec<_> = results.iter().map(|r| r.source_path.clone()).collect();
        assert_eq!(order, [PathBuf::from("/c/b.cpp"), PathBuf::from("/c/a.cpp")]);
        assert_eq!(results.len(), 2);
        assert_eq!(results.passed(), 1);
        assert_eq!(results.failed(), 1);
        assert!(results.get(Path::new("/c/a.cpp")).unwrap().success());
        assert!(results.get(Path::new("/c/zzz.cpp")).is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut results = ResultCollection::new();
        results.insert(record("/c/a.cpp", 1));
        results.insert(record("/c/b.cpp", 0));

        let replaced = results.insert(record("/c/a.cpp", 0)).unwrap();
        assert_eq!(replaced.outcome.exit_code, 1);
        assert_eq!(results.len(), 2);
        assert!(results.get(Path::new("/c/a.cpp")).unwrap().success());
        assert_eq!(results.iter().next().unwrap().source_path, Path::new("/c/a.cpp"));
    }

    #[test]
    fn job_error_record_fails() {
        let record = ResultRecord::job_error("/c/x.cpp", String::new(), "disk full");
        assert!(!record.success());
        assert!(record.outcome.diagnostics.contains("disk full"));
    }
}
