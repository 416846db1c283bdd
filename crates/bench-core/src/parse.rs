//! Tolerant reader for classifier log files.
//!
//! Each line of a log is its own JSON document. A line holding a one-element
//! array yields one record. Lines that are not JSON at all are logged and
//! skipped; valid JSON of any other shape (blank lines included) is dropped
//! without a word.
//!
//! Logs are discovered by name: `test_<category>_<model>.log`, where the model
//! name had its `:` replaced by `_` when the file was written.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::Value;
use walkdir::WalkDir;

use crate::record::{Category, ClassificationRecord};

const LOG_SUFFIX: &str = ".log";

/// What a single log line turned out to be.
#[derive(Debug)]
pub enum LineOutcome {
    Record(ClassificationRecord),
    DecodeError(serde_json::Error),
    ShapeMismatch,
}

pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::ShapeMismatch;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return LineOutcome::DecodeError(e),
    };

    match value {
        Value::Array(mut items) if items.len() == 1 => {
            LineOutcome::Record(ClassificationRecord::from_value(items.swap_remove(0)))
        }
        _ => LineOutcome::ShapeMismatch,
    }
}

/// Records recovered from one log, plus how many lines failed to decode.
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub records: Vec<ClassificationRecord>,
    pub decode_errors: usize,
}

/// Read every line of `reader`. `source` names the log in diagnostics.
pub fn parse_lines<R: BufRead>(reader: R, source: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (idx, line) in reader.split(b'\n').enumerate() {
        let bytes = match line {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Read error in {source} after line {idx}: {e}");
                break;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        match parse_line(&text) {
            LineOutcome::Record(record) => parsed.records.push(record),
            LineOutcome::DecodeError(e) => {
                parsed.decode_errors += 1;
                warn!(
                    "Error decoding JSON in {source} (line {}): {e}: {}",
                    idx + 1,
                    text.trim()
                );
            }
            LineOutcome::ShapeMismatch => {}
        }
    }

    parsed
}

/// Read a log file. An unreadable file is reported and yields no records.
pub fn read_log(path: &Path) -> ParsedLog {
    match File::open(path) {
        Ok(file) => parse_lines(BufReader::new(file), &path.display().to_string()),
        Err(e) => {
            warn!("Cannot open {}: {e}", path.display());
            ParsedLog::default()
        }
    }
}

pub fn parse_log_file(path: &Path) -> Vec<ClassificationRecord> {
    read_log(path).records
}

/// A discovered log and the model it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub model_name: String,
}

/// Recover the model name from a log file name, e.g.
/// `test_safe_gemma2_27b.log` -> `gemma2:27b`.
///
/// Every `_` becomes `:`, so a model whose real name contains an underscore
/// comes back with a colon in its place.
pub fn model_name_from_file(file_name: &str, category: Category) -> Option<String> {
    let stem = file_name
        .strip_prefix(category.log_prefix().as_str())?
        .strip_suffix(LOG_SUFFIX)?;
    Some(stem.replace('_', ":"))
}

/// List `test_<category>_*.log` files directly inside `dir`, sorted by path.
pub fn discover_logs(dir: &Path, category: Category) -> Vec<LogFile> {
    let mut logs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot list {}: {e}", dir.display());
                continue;
            }
        };
        let path = entry.into_path();
        if !path.is_file() {
            continue;
        }
        let Some(model_name) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| model_name_from_file(name, category))
        else {
            continue;
        };
        logs.push(LogFile { path, model_name });
    }

    logs.sort_by(|a, b| a.path.cmp(&b.path));
    logs
}
