use super::extract::extract_fields;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of shipped log data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub file: String,
    pub host: String,
    pub message: String,
    pub source_type: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A decoded log line with the fields pulled out of its message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredEntry {
    pub engagement_id: Option<String>,
    pub title: Option<String>,
    pub severity: Option<String>,
    pub stack_trace: Option<String>,

    /// The shipped message, never modified
    pub full_message: String,

    pub file: String,
    pub host: String,
    pub source_type: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,

    /// True when the message carried the engagement/title/severity/stack trace layout
    #[serde(rename = "expected_message_schema", default)]
    pub has_structured_fields: bool,
}

/// One element of a batch: a decoded entry, or the raw line when decoding failed.
///
/// Serialized untagged, so raw lines appear as plain JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Structured(StructuredEntry),
    Raw(String),
}

impl Entry {
    /// The message text this entry carries.
    pub fn message(&self) -> &str {
        match self {
            Entry::Structured(entry) => &entry.full_message,
            Entry::Raw(line) => line,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Entry::Raw(_))
    }
}

#[derive(Debug, Error)]
#[error("line is not an array of log lines: {0}")]
pub struct UnrecognizedLine(#[from] serde_json::Error);

/// Decode one body line as a JSON array of [`LogLine`] and extract each element.
///
/// Every kind of failure (bad JSON, wrong shape, missing field, bad type)
/// collapses into [`UnrecognizedLine`].
pub fn decode_line(line: &str) -> Result<Vec<StructuredEntry>, UnrecognizedLine> {
    let lines: Vec<LogLine> = serde_json::from_str(line)?;
    Ok(lines.iter().map(extract_fields).collect())
}
