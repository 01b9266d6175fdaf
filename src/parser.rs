use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Rejection, SkippedFragment};
use crate::record::Record;

/// Characters of a skipped fragment kept in its diagnostic.
const SUMMARY_CHARS: usize = 100;

/// Records recovered from a log, plus the fragments that had to be dropped.
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedFragment>,
}

/// A candidate object sliced out of the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    /// False when the text ended, or another object began, before the closing brace.
    pub closed: bool,
}

/// Parse a hike log into validated records, in source order.
///
/// The whole text is decoded first as a bracketed sequence of objects. When
/// that fails the text is split into fragments and each one is decoded on
/// its own, so one damaged record never costs the rest of the file.
pub fn parse_hike_log(text: &str) -> ParsedLog {
    let body = strip_trailing_separators(text);
    if body.is_empty() {
        return ParsedLog::default();
    }

    if let Some(values) = decode_whole(body) {
        return ParsedLog {
            records: values.into_iter().filter_map(accept).collect(),
            skipped: Vec::new(),
        };
    }

    let mut log = ParsedLog::default();
    for fragment in scan_fragments(body) {
        let source = close_fragment(fragment);
        match serde_json::from_str::<Value>(&source) {
            Ok(value) => log.records.extend(accept(value)),
            Err(e) => {
                let skipped = SkippedFragment {
                    summary: source.chars().take(SUMMARY_CHARS).collect(),
                    reason: e.to_string(),
                };
                warn!("{skipped}");
                log.skipped.push(skipped);
            }
        }
    }

    debug!(
        records = log.records.len(),
        skipped = log.skipped.len(),
        "recovered log by fragment scan"
    );
    log
}

fn strip_trailing_separators(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
}

/// Decode the body as one array, wrapping bare object sequences in brackets.
fn decode_whole(body: &str) -> Option<Vec<Value>> {
    if body.starts_with('[') {
        serde_json::from_str(body).ok()
    } else {
        serde_json::from_str(&format!("[{body}]")).ok()
    }
}

/// Split raw text into object-like fragments by tracking brace depth.
///
/// Records are flat, so depth never exceeds one: an opening brace seen while
/// a fragment is still open means that fragment was cut short. Braces inside
/// string literals are not delimiters. A raw newline ends a string literal,
/// since JSON strings cannot contain one.
pub fn scan_fragments(text: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                '\n' => {
                    in_string = false;
                    escaped = false;
                }
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if let Some(open) = start {
                    fragments.push(Fragment {
                        text: &text[open..i],
                        closed: false,
                    });
                }
                start = Some(i);
            }
            '}' => {
                if let Some(open) = start.take() {
                    fragments.push(Fragment {
                        text: &text[open..=i],
                        closed: true,
                    });
                }
            }
            _ => {}
        }
    }

    if let Some(open) = start {
        fragments.push(Fragment {
            text: &text[open..],
            closed: false,
        });
    }

    fragments
}

/// Append the missing closing brace to a truncated fragment, dropping any
/// dangling separator before it.
pub fn close_fragment(fragment: Fragment<'_>) -> Cow<'_, str> {
    if fragment.closed {
        return Cow::Borrowed(fragment.text);
    }
    let body = fragment
        .text
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    Cow::Owned(format!("{body}}}"))
}

fn accept(value: Value) -> Option<Record> {
    match validate(value) {
        Ok(record) => Some(record),
        Err(reason) => {
            debug!(%reason, "rejected record");
            None
        }
    }
}

/// Turn a decoded value into a record.
///
/// `lat` and `lng` must be numbers and not both zero. `altitude` defaults to
/// 0, `timestamp` to empty. Remaining numeric fields become sensor readings.
pub fn validate(value: Value) -> Result<Record, Rejection> {
    let Value::Object(mut fields) = value else {
        return Err(Rejection::NotAnObject);
    };

    let lat = coordinate(&fields, "lat")?;
    let lng = coordinate(&fields, "lng")?;
    if lat == 0.0 && lng == 0.0 {
        return Err(Rejection::NoFix);
    }
    fields.remove("lat");
    fields.remove("lng");

    let mut record = Record::new(lat, lng);
    record.altitude = fields
        .remove("altitude")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    if let Some(Value::String(ts)) = fields.remove("timestamp") {
        record.timestamp = ts.trim().to_string();
    }
    record.extra_sensors = fields
        .into_iter()
        .filter_map(|(key, v)| v.as_f64().map(|reading| (key, reading)))
        .collect();

    Ok(record)
}

fn coordinate(fields: &Map<String, Value>, key: &'static str) -> Result<f64, Rejection> {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .ok_or(Rejection::MissingCoordinate(key))
}
