pub mod batch;
pub mod extract;
pub mod record;
pub mod timestamp;

pub use batch::{accumulate, Batch, IngestError};
pub use extract::{extract_fields, parse_message, MessageFields};
pub use record::{decode_line, Entry, LogLine, StructuredEntry, UnrecognizedLine};
