//! Classification records as written by the email classifier, one per log line.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ground-truth class of the emails a log was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Safe,
    Malicious,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Safe, Category::Malicious];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Safe => "safe",
            Category::Malicious => "malicious",
        }
    }

    /// File name prefix shared by every log of this category, e.g. `test_safe_`.
    pub fn log_prefix(self) -> String {
        format!("test_{}_", self.as_str())
    }

    /// Whether a verdict counts as correct for an email of this category.
    ///
    /// Any label other than "safe" is a hit for malicious emails, so spam,
    /// phishing and malicious verdicts are interchangeable here.
    pub fn is_correct(self, classification: &str) -> bool {
        let said_safe = classification.to_lowercase() == "safe";
        match self {
            Category::Safe => said_safe,
            Category::Malicious => !said_safe,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(Category::Safe),
            "malicious" => Ok(Category::Malicious),
            _ => Err(format!("Unknown category: {s}. Use 'safe' or 'malicious'.")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<String>,
}

/// One classifier result. Every field is optional: failed attempts only carry
/// `file` and `error`, and mistyped fields decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassificationRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email_metadata: Option<EmailMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub classification: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub certainty_level: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub inference_time: Option<f64>,
    /// Set whenever the key exists, even with a `null` value.
    #[serde(default, deserialize_with = "present_as_text")]
    pub error: Option<String>,
}

impl ClassificationRecord {
    /// Build a record from the single element of a log line.
    /// Anything other than a JSON object yields a record with no fields set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The verdict and latency, when the record can be scored at all.
    pub fn scorable(&self) -> Option<(&str, f64)> {
        if self.is_error() {
            return None;
        }
        match (self.classification.as_deref(), self.inference_time) {
            (Some(label), Some(time)) => Some((label, time)),
            _ => None,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn present_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}
