//! Run report rendering.
//!
//! One entry per record, in completion order, with the path relative to the
//! source directory, the verdict, the compiler's diagnostics (ANSI escapes
//! stripped), the exit code and the source text that was compiled.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use ccv_config::ReportFormat;
use ccv_engine::{outcome::OutcomeKind, results::ResultCollection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use strip_ansi_escapes::strip;

use crate::console::relative_path;
use crate::prelude::*;

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub ok: bool,
    pub kind: OutcomeKind,
    pub code: i32,
    pub message: String,
    pub source: String,
}

fn strip_ansi_codes(input: &str) -> String {
    String::from_utf8_lossy(&strip(input.as_bytes())).to_string()
}

impl Report {
    pub fn new(root: &Path, results: &ResultCollection, generated_at: DateTime<Utc>) -> Self {
        let results: Vec<ReportEntry> = results
            .iter()
            .map(|record| ReportEntry {
                path: relative_path(root, &record.source_path).to_path_buf(),
                ok: record.success(),
                kind: record.outcome.kind,
                code: record.outcome.exit_code,
                message: strip_ansi_codes(&record.outcome.diagnostics),
                source: record.source.clone(),
            })
            .collect();
        let passed = results.iter().filter(|entry| entry.ok).count();

        Self {
            generated_at,
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    pub fn dump_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    pub fn dump_html<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html>")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "<meta charset=\"utf-8\">")?;
        writeln!(writer, "<title>Compile report</title>")?;
        writeln!(writer, "<style>{}</style>", STYLE)?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        writeln!(writer, "<h1>Compile report</h1>")?;
        writeln!(
            writer,
            "<p class=\"summary\">Generated {} - {} passed, {} failed</p>",
            self.generated_at.to_rfc3339(),
            self.passed,
            self.failed
        )?;

        for entry in &self.results {
            let verdict = if entry.ok { "pass" } else { "fail" };
            writeln!(writer, "<section class=\"{}\">", verdict)?;
            writeln!(
                writer,
                "<h2>{} <span>{}</span></h2>",
                escape_html(&entry.path.display().to_string()),
                verdict.to_uppercase()
            )?;
            writeln!(writer, "<p>Exit code: {}</p>", entry.code)?;
            if !entry.message.is_empty() {
                writeln!(writer, "<pre class=\"message\">{}</pre>", escape_html(&entry.message))?;
            }
            writeln!(writer, "<details><summary>Source</summary>")?;
            writeln!(writer, "<pre class=\"source\">{}</pre>", escape_html(&entry.source))?;
            writeln!(writer, "</details>")?;
            writeln!(writer, "</section>")?;
        }

        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;
        Ok(())
    }

    pub fn dump<W: Write>(&self, format: ReportFormat, writer: W) -> Result<()> {
        match format {
            ReportFormat::Html => self.dump_html(writer),
            ReportFormat::Json => self.dump_json(writer),
        }
    }

    /// Write the report to `path`, replacing any previous report.
    pub fn write_to_file(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Report {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.dump(format, &mut writer)?;
        writer.flush().map_err(|source| Error::Report {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
section{border-left:4px solid;padding:0 1em;margin:1em 0}\
section.pass{border-color:#2a2}\
section.fail{border-color:#c22}\
pre{background:#f4f4f4;padding:.5em;overflow-x:auto}";

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
