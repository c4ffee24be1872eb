//! Stable join key derivation shared by movie and vector records.

use serde_json::Value;

use crate::records::Record;

/// Derives the stable key for a record.
///
/// Precedence: `imdbId`, `id`, `key`, `title|year`, `title:<title>`. Titles
/// are lower-cased. Returns an empty string when no candidate is usable.
pub fn stable_key(record: &Record) -> String {
    for field in ["imdbId", "id", "key"] {
        if let Some(value) = field_text(record.get(field)) {
            return value;
        }
    }
    let title = field_text(record.get("title")).map(|title| title.to_lowercase());
    let year = field_text(record.get("year"));
    match (title, year) {
        (Some(title), Some(year)) => format!("{title}|{year}"),
        (Some(title), None) => format!("title:{title}"),
        _ => String::new(),
    }
}

/// Key for a vector record: an explicit `key` field wins, otherwise the
/// record's [`stable_key`].
pub fn vector_key(record: &Record) -> String {
    field_text(record.get("key")).unwrap_or_else(|| stable_key(record))
}

/// Whether a JSON value counts as present for key and field fallback.
///
/// `null`, `false`, zero, and empty strings, arrays or objects are treated
/// as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// Trimmed, non-empty scalar text for a field. Booleans and containers are not
// usable key material.
fn field_text(value: Option<&Value>) -> Option<String> {
    let value = value.filter(|value| is_truthy(value))?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
