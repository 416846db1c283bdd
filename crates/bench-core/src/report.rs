//! Output formatting for benchmark results.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::score::{mean, CategorySummary};

pub const REPORT_TITLE: &str = "# Benchmark Results";

/// Placeholder for cells with no data behind them.
pub const NOT_APPLICABLE: &str = "N/A";

/// Header text and padded width of each table column.
const COLUMNS: [(&str, usize); 4] = [
    ("Model", 14),
    ("Safe Accuracy (%)", 17),
    ("Malicious Accuracy (%)", 22),
    ("Avg Inference Time (s)", 22),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub model_name: String,
    pub safe_accuracy: Option<f64>,
    pub malicious_accuracy: Option<f64>,
    /// Only set when the model has a latency in both categories.
    pub avg_inference_time: Option<f64>,
}

/// One row per model seen in either category, sorted by model name.
pub fn comparison_rows(safe: &CategorySummary, malicious: &CategorySummary) -> Vec<ComparisonRow> {
    let models: BTreeSet<&String> = safe.keys().chain(malicious.keys()).collect();

    models
        .into_iter()
        .map(|model| {
            let safe_summary = safe.get(model);
            let malicious_summary = malicious.get(model);

            let avg_inference_time = match (
                safe_summary.and_then(|s| s.avg_inference_time),
                malicious_summary.and_then(|s| s.avg_inference_time),
            ) {
                (Some(safe_time), Some(malicious_time)) => mean(&[safe_time, malicious_time]),
                _ => None,
            };

            ComparisonRow {
                model_name: model.clone(),
                safe_accuracy: safe_summary.map(|s| s.accuracy),
                malicious_accuracy: malicious_summary.map(|s| s.accuracy),
                avg_inference_time,
            }
        })
        .collect()
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NOT_APPLICABLE.to_string(),
    }
}

fn table_line(cells: &[String]) -> String {
    let mut line = String::from("|");
    for (cell, (_, width)) in cells.iter().zip(COLUMNS) {
        line.push_str(&format!(" {cell:<width$} |"));
    }
    line.push('\n');
    line
}

pub fn render_markdown_table(rows: &[ComparisonRow]) -> String {
    let header: Vec<String> = COLUMNS.iter().map(|(title, _)| title.to_string()).collect();
    let mut table = table_line(&header);

    table.push('|');
    for (_, width) in COLUMNS {
        table.push_str(&"-".repeat(width + 2));
        table.push('|');
    }
    table.push('\n');

    for row in rows {
        table.push_str(&table_line(&[
            row.model_name.clone(),
            format_cell(row.safe_accuracy),
            format_cell(row.malicious_accuracy),
            format_cell(row.avg_inference_time),
        ]));
    }

    table
}

/// The full Markdown document: title, blank line, comparison table.
pub fn render_report(safe: &CategorySummary, malicious: &CategorySummary) -> String {
    let rows = comparison_rows(safe, malicious);
    format!("{REPORT_TITLE}\n\n{}", render_markdown_table(&rows))
}

pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Cannot write {}", path.display()))
}

pub fn print_summary(safe: &CategorySummary, malicious: &CategorySummary) {
    println!("\n{}", "=".repeat(70));
    println!("BENCHMARK SUMMARY");
    println!("{}", "=".repeat(70));

    for (label, table) in [("SAFE EMAILS", safe), ("MALICIOUS EMAILS", malicious)] {
        println!("\n{label} ({} models):", table.len());
        if table.is_empty() {
            println!("  no logs found");
        }
        for summary in table.values() {
            println!(
                "  {:<24} {:>6.2}%  correct {}/{}  errors {}  unclassified {}",
                summary.model_name,
                summary.accuracy,
                summary.correct,
                summary.total,
                summary.errors,
                summary.unclassified
            );
        }
    }
    println!("{}", "=".repeat(70));
}
