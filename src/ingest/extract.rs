use super::record::{LogLine, StructuredEntry};

const ENGAGEMENT_TOKEN: &str = "Engagement Id:";
const TITLE_TOKEN: &str = "Title :";
const SEVERITY_TOKEN: &str = "Severity ::";
const STACK_TRACE_TOKEN: &str = "StackTrace ::";

/// Where a token has to sit relative to the tokens before it.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// The message must begin with the token.
    MessageStart,
    /// The token must start strictly after the previous token's start.
    AfterPrevious,
}

/// Field labels in the order they must appear in a message.
const TOKENS: [(&str, Anchor); 4] = [
    (ENGAGEMENT_TOKEN, Anchor::MessageStart),
    (TITLE_TOKEN, Anchor::AfterPrevious),
    (SEVERITY_TOKEN, Anchor::AfterPrevious),
    (STACK_TRACE_TOKEN, Anchor::AfterPrevious),
];

/// The four fields carried by a recognized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFields {
    pub engagement_id: String,
    pub title: String,
    pub severity: String,
    pub stack_trace: String,
}

/// Build a [`StructuredEntry`] for a shipped log line.
///
/// Never fails: a message that does not follow the
/// `Engagement Id: .. Title : .. Severity :: .. StackTrace :: ..` layout
/// produces an entry with all four semantic fields unset.
pub fn extract_fields(line: &LogLine) -> StructuredEntry {
    let fields = parse_message(&line.message);
    let has_structured_fields = fields.is_some();
    let (engagement_id, title, severity, stack_trace) = match fields {
        Some(f) => (
            Some(f.engagement_id),
            Some(f.title),
            Some(f.severity),
            Some(f.stack_trace),
        ),
        None => (None, None, None, None),
    };

    StructuredEntry {
        engagement_id,
        title,
        severity,
        stack_trace,
        full_message: line.message.clone(),
        file: line.file.clone(),
        host: line.host.clone(),
        source_type: line.source_type.clone(),
        timestamp: line.timestamp,
        has_structured_fields,
    }
}

/// Split a message into its four labelled fields.
///
/// Returns `None` when a label is missing, when the message does not start
/// with the engagement label, or when the labels are out of order.
pub fn parse_message(message: &str) -> Option<MessageFields> {
    let mut starts = [0usize; TOKENS.len()];

    for (i, (token, anchor)) in TOKENS.iter().enumerate() {
        let index = find_ignore_ascii_case(message, token)?;
        let in_place = match anchor {
            Anchor::MessageStart => index == 0,
            Anchor::AfterPrevious => index > starts[i - 1],
        };
        if !in_place {
            return None;
        }
        starts[i] = index;
    }

    let span = |i: usize| {
        let end = starts.get(i + 1).copied().unwrap_or(message.len());
        clean_span(&message[starts[i]..end], TOKENS[i].0)
    };

    Some(MessageFields {
        engagement_id: span(0),
        title: span(1),
        severity: span(2),
        stack_trace: span(3),
    })
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
///
/// Only ASCII letters are folded. A label written with look-alike characters
/// such as `ı` (dotless i) or `ſ` (long s) does not match, even though
/// Unicode-aware ordinal comparison would treat them as `I` and `S`.
///
/// Tokens are pure ASCII, so a match always starts on a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, pat) = (haystack.as_bytes(), needle.as_bytes());
    if pat.is_empty() || pat.len() > hay.len() {
        return None;
    }
    hay.windows(pat.len())
        .position(|window| window.eq_ignore_ascii_case(pat))
}

/// Strip the leading label and the separators around a field value.
fn clean_span(span: &str, token: &str) -> String {
    let value = span[token.len()..].trim().trim_end_matches('-').trim();
    strip_wrapping_quotes(value).trim().to_string()
}

fn strip_wrapping_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
