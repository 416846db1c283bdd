//! Benchmark run orchestration: discover logs, score them, write the report.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use log::{debug, info};
use rayon::prelude::*;

use crate::parse::{discover_logs, read_log};
use crate::record::Category;
use crate::report::{render_report, write_report};
use crate::score::{summarize_records, CategorySummary};

pub const DEFAULT_REPORT_FILE: &str = "benchmark.md";

/// Configuration for a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub log_dir: PathBuf,
    pub categories: Vec<Category>,
    pub output_path: PathBuf,
}

impl BenchmarkConfig {
    /// Both categories, report written to `benchmark.md` in the working directory.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            categories: Category::ALL.to_vec(),
            output_path: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

/// Atomic counters, updated from the rayon workers.
pub struct ScanProgress {
    pub log_files: AtomicUsize,
    pub parsed_files: AtomicUsize,
    pub records: AtomicUsize,
    pub decode_errors: AtomicUsize,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self {
            log_files: AtomicUsize::new(0),
            parsed_files: AtomicUsize::new(0),
            records: AtomicUsize::new(0),
            decode_errors: AtomicUsize::new(0),
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary tables for both categories. A category left out of the run has an
/// empty table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkResults {
    pub safe: CategorySummary,
    pub malicious: CategorySummary,
}

impl BenchmarkResults {
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.malicious.is_empty()
    }

    pub fn render(&self) -> String {
        render_report(&self.safe, &self.malicious)
    }
}

/// Read and score every `test_<category>_*.log` in `dir`.
pub fn summarize_category(dir: &Path, category: Category, progress: &ScanProgress) -> CategorySummary {
    let logs = discover_logs(dir, category);
    progress.log_files.fetch_add(logs.len(), Ordering::Relaxed);

    let summary: CategorySummary = logs
        .par_iter()
        .map(|log_file| {
            let parsed = read_log(&log_file.path);
            progress.records.fetch_add(parsed.records.len(), Ordering::Relaxed);
            progress
                .decode_errors
                .fetch_add(parsed.decode_errors, Ordering::Relaxed);

            let summary = summarize_records(&log_file.model_name, &parsed.records, category);
            debug!(
                "{}: {} records, {} correct, {} errors, {} unclassified",
                log_file.path.display(),
                summary.total,
                summary.correct,
                summary.errors,
                summary.unclassified
            );

            progress.parsed_files.fetch_add(1, Ordering::Relaxed);
            (log_file.model_name.clone(), summary)
        })
        .collect();

    info!("{category}: {} models from {}", summary.len(), dir.display());
    summary
}

/// Score every configured category, then write the Markdown report.
/// Unreadable logs only degrade the numbers; the run fails only when the
/// report cannot be written.
pub fn run_benchmark(config: &BenchmarkConfig, progress: &ScanProgress) -> Result<BenchmarkResults> {
    let mut results = BenchmarkResults::default();

    for &category in &config.categories {
        let summary = summarize_category(&config.log_dir, category, progress);
        match category {
            Category::Safe => results.safe = summary,
            Category::Malicious => results.malicious = summary,
        }
    }

    write_report(&config.output_path, &results.render())?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_log(dir: &Path, name: &str, lines: &[&str]) {
        fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    fn bench_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "test_safe_gemma2_27b.log",
            &[
                r#"[{"file": "a.eml", "classification": "Safe", "inference_time": 1.0}]"#,
                r#"[{"file": "b.eml", "classification": "Phishing", "inference_time": 2.0}]"#,
                r#"[{"file": "c.eml", "error": "timeout"}]"#,
            ],
        );
        write_log(
            dir.path(),
            "test_malicious_gemma2_27b.log",
            &[
                r#"[{"file": "d.eml", "classification": "Spam", "inference_time": 3.0}]"#,
                "{broken",
                r#"[{"file": "e.eml", "classification": "Safe", "inference_time": 5.0}]"#,
            ],
        );
        write_log(
            dir.path(),
            "test_safe_phi3_mini.log",
            &[r#"[{"file": "a.eml", "classification": "safe", "inference_time": 0.5}]"#],
        );
        dir
    }

    #[test]
    fn category_tables_per_model() {
        let dir = bench_dir();
        let progress = ScanProgress::new();

        let safe = summarize_category(dir.path(), Category::Safe, &progress);
        assert_eq!(safe.keys().collect::<Vec<_>>(), vec!["gemma2:27b", "phi3:mini"]);
        assert_eq!(safe["gemma2:27b"].total, 3);
        assert_eq!(safe["gemma2:27b"].correct, 1);
        assert_eq!(safe["phi3:mini"].accuracy, 100.0);

        let malicious = summarize_category(dir.path(), Category::Malicious, &progress);
        assert_eq!(malicious["gemma2:27b"].total, 2);
        assert_eq!(malicious["gemma2:27b"].accuracy, 50.0);

        assert_eq!(progress.log_files.load(Ordering::Relaxed), 3);
        assert_eq!(progress.parsed_files.load(Ordering::Relaxed), 3);
        assert_eq!(progress.records.load(Ordering::Relaxed), 6);
        assert_eq!(progress.decode_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn empty_log_file_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "test_safe_tiny_1b.log", &["", "not json", "[]"]);

        let safe = summarize_category(dir.path(), Category::Safe, &ScanProgress::new());
        let summary = &safe["tiny:1b"];
        assert_eq!(summary.total, 0);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.avg_inference_time, None);
    }

    #[test]
    fn run_writes_report() {
        let dir = bench_dir();
        let mut config = BenchmarkConfig::new(dir.path());
        config.output_path = dir.path().join("benchmark.md");

        let results = run_benchmark(&config, &ScanProgress::new()).unwrap();
        assert!(!results.is_empty());

        let report = fs::read_to_string(&config.output_path).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "# Benchmark Results");
        assert_eq!(lines.len(), 6);

        let gemma: Vec<_> = lines[4].split('|').map(str::trim).collect();
        // safe avg 1.5, malicious avg 4.0
        assert_eq!(gemma[1..5], ["gemma2:27b", "33.33", "50.00", "2.75"]);

        let phi: Vec<_> = lines[5].split('|').map(str::trim).collect();
        assert_eq!(phi[1..5], ["phi3:mini", "100.00", "N/A", "N/A"]);
    }

    #[test]
    fn run_without_logs_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BenchmarkConfig::new(dir.path().join("missing"));
        config.output_path = dir.path().join("benchmark.md");

        let results = run_benchmark(&config, &ScanProgress::new()).unwrap();
        assert!(results.is_empty());

        let report = fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(report.lines().count(), 4);
    }

    #[test]
    fn category_subset_leaves_other_table_empty() {
        let dir = bench_dir();
        let mut config = BenchmarkConfig::new(dir.path());
        config.categories = vec![Category::Malicious];
        config.output_path = dir.path().join("out.md");

        let results = run_benchmark(&config, &ScanProgress::new()).unwrap();
        assert!(results.safe.is_empty());
        assert_eq!(results.malicious.len(), 1);
    }

    #[test]
    fn default_config() {
        let config = BenchmarkConfig::new(".");
        assert_eq!(config.log_dir, PathBuf::from("."));
        assert_eq!(config.categories, vec![Category::Safe, Category::Malicious]);
        assert_eq!(config.output_path, PathBuf::from("benchmark.md"));
    }
}
