use super::record::{decode_line, Entry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read request body: {0}")]
    StreamRead(#[from] std::io::Error),
}

/// Everything received in one request, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique per request, also the storage key
    pub id: Uuid,

    /// Decoded entries and raw fallback lines, in arrival order
    #[serde(rename = "logs")]
    pub entries: Vec<Entry>,

    pub created: DateTime<Utc>,

    /// Whether the most recently processed line decoded.
    /// Each line overwrites it, earlier lines have no say.
    pub expected_schema: bool,
}

impl Batch {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            entries: Vec::new(),
            created: Utc::now(),
            expected_schema: false,
        }
    }

    /// Decode one body line and append what it produced.
    pub fn push_line(&mut self, line: &str) {
        match decode_line(line) {
            Ok(decoded) => {
                self.entries
                    .extend(decoded.into_iter().map(Entry::Structured));
                self.expected_schema = true;
            }
            Err(e) => {
                debug!(batch_id = %self.id, error = %e, "Keeping unrecognized line as raw entry");
                self.entries.push(Entry::Raw(line.to_string()));
                self.expected_schema = false;
            }
        }
    }

    pub fn raw_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_raw()).count()
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `reader` line by line until EOF and build a batch from it.
///
/// Lines end at `\n` (an optional preceding `\r` is dropped). Invalid UTF-8 is
/// replaced rather than rejected. Only a failing reader aborts the batch.
pub async fn accumulate<R>(mut reader: R) -> Result<Batch, IngestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut batch = Batch::new();
    let mut buf = Vec::new();
    let mut line_count = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = strip_line_terminator(&buf);
        batch.push_line(&String::from_utf8_lossy(line));
        line_count += 1;
    }

    info!(
        batch_id = %batch.id,
        lines = line_count,
        entries = batch.entries.len(),
        raw = batch.raw_count(),
        expected_schema = batch.expected_schema,
        "Batch assembled"
    );

    Ok(batch)
}

fn strip_line_terminator(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}
