//! Per-model accuracy and latency for one category of emails.

use std::collections::BTreeMap;

use crate::record::{Category, ClassificationRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub model_name: String,
    /// Percentage of all records, failed ones included, that were correct.
    pub accuracy: f64,
    /// `None` when no record could be scored.
    pub avg_inference_time: Option<f64>,
    pub total: usize,
    pub correct: usize,
    pub errors: usize,
    pub unclassified: usize,
}

/// Summaries of one category, keyed and ordered by model name.
pub type CategorySummary = BTreeMap<String, ModelSummary>;

pub fn summarize_records(
    model_name: &str,
    records: &[ClassificationRecord],
    category: Category,
) -> ModelSummary {
    let mut correct = 0;
    let mut errors = 0;
    let mut unclassified = 0;
    let mut inference_times = Vec::new();

    for record in records {
        if record.is_error() {
            errors += 1;
            continue;
        }
        let Some((classification, inference_time)) = record.scorable() else {
            unclassified += 1;
            continue;
        };
        if category.is_correct(classification) {
            correct += 1;
        }
        inference_times.push(inference_time);
    }

    let total = records.len();
    let accuracy = if total > 0 {
        correct as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    ModelSummary {
        model_name: model_name.to_string(),
        accuracy,
        avg_inference_time: mean(&inference_times),
        total,
        correct,
        errors,
        unclassified,
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
