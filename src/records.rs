//! Line-oriented JSON record reader.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{BuildError, BuildResult};

/// A JSON object parsed from one NDJSON line.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based physical line number in the source file.
    pub line: usize,
    /// Parsed object fields, in source order.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Looks up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Reads every object record from `path`.
///
/// A missing file yields an empty list; other I/O failures are errors.
pub fn read_records(path: &Path) -> BuildResult<Vec<Record>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "dataset missing; treating as empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(BuildError::io(path, err)),
    };
    let records = parse_records(BufReader::new(file)).map_err(|err| BuildError::io(path, err))?;
    tracing::debug!(path = %path.display(), records = records.len(), "read dataset");
    Ok(records)
}

/// Parses NDJSON from any buffered reader.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Blank lines, `#`/`//` comment
/// lines, invalid UTF-8, malformed JSON and non-object values are skipped
/// without error. Bare `NaN`, `Infinity` and `-Infinity` literals are read
/// as `null`.
pub fn parse_records<R: BufRead>(mut reader: R) -> io::Result<Vec<Record>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    let mut records = Vec::new();
    for (idx, line) in split_lines(&buf).enumerate() {
        let Ok(text) = std::str::from_utf8(line) else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') || text.starts_with("//") {
            continue;
        }
        let text = null_non_finite(text);
        if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(&text) {
            records.push(Record {
                line: idx + 1,
                fields,
            });
        }
    }
    Ok(records)
}

fn split_lines(buf: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = buf;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.iter().position(|b| *b == b'\n' || *b == b'\r') else {
            let line = rest;
            rest = &[];
            return Some(line);
        };
        let line = &rest[..end];
        let skip = if rest[end..].starts_with(b"\r\n") { 2 } else { 1 };
        rest = &rest[end + skip..];
        Some(line)
    })
}

// Replaces non-finite number literals outside string literals with `null`.
fn null_non_finite(text: &str) -> Cow<'_, str> {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut idx = 0;
    while let Some(ch) = text[idx..].chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if let Some(len) = ["NaN", "Infinity", "-Infinity"]
            .iter()
            .find(|token| text[idx..].starts_with(**token))
            .map(|token| token.len())
        {
            out.push_str("null");
            idx += len;
            continue;
        }
        out.push(ch);
        idx += ch.len_utf8();
    }
    Cow::Owned(out)
}
