//! Raw JSON vector validation and dimension inference.

use std::fmt;

use serde_json::Value;

use crate::records::Record;

/// Field holding the embedding on vector records.
pub const VECTOR_FIELD: &str = "vector";

/// Reasons a raw vector value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorRejection {
    /// Value missing or not a JSON array.
    NotASequence,
    /// Array with no elements.
    Empty,
    /// Length differs from the inferred dimension.
    DimensionMismatch {
        /// Inferred dimension.
        expected: usize,
        /// Length of the offending array.
        actual: usize,
    },
    /// Element that cannot be read as a float.
    NotNumeric {
        /// Position of the element.
        index: usize,
    },
    /// Nested array element.
    NotOneDimensional,
    /// NaN, infinite, or out of `f32` range.
    NonFinite {
        /// Position of the element.
        index: usize,
    },
}

impl fmt::Display for VectorRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotASequence => write!(f, "vector is not an array"),
            Self::Empty => write!(f, "vector is empty"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "vector has {actual} values, expected {expected}")
            }
            Self::NotNumeric { index } => write!(f, "vector value {index} is not numeric"),
            Self::NotOneDimensional => write!(f, "vector is not one-dimensional"),
            Self::NonFinite { index } => write!(f, "vector value {index} is not finite"),
        }
    }
}

impl std::error::Error for VectorRejection {}

/// Validates `value` into an `f32` vector of `expected_dim` elements.
///
/// No normalization happens here; that is done over the whole batch.
pub fn coerce_vector(
    value: Option<&Value>,
    expected_dim: Option<usize>,
) -> Result<Vec<f32>, VectorRejection> {
    let Some(Value::Array(items)) = value else {
        return Err(VectorRejection::NotASequence);
    };
    if items.is_empty() {
        return Err(VectorRejection::Empty);
    }
    if let Some(expected) = expected_dim {
        if items.len() != expected {
            return Err(VectorRejection::DimensionMismatch {
                expected,
                actual: items.len(),
            });
        }
    }

    let mut raw = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let number = match item {
            Value::Number(n) => n.as_f64(),
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::String(s) => Some(
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| VectorRejection::NotNumeric { index })?,
            ),
            // null converts to NaN and is caught by the finiteness check
            Value::Null => None,
            Value::Array(_) => return Err(VectorRejection::NotOneDimensional),
            Value::Object(_) => return Err(VectorRejection::NotNumeric { index }),
        };
        raw.push(number);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, number)| {
            number
                .map(|n| n as f32)
                .filter(|n| n.is_finite())
                .ok_or(VectorRejection::NonFinite { index })
        })
        .collect()
}

/// Length of the first record whose `vector` is a non-empty array.
pub fn infer_dimension(records: &[Record]) -> Option<usize> {
    records.iter().find_map(|record| match record.get(VECTOR_FIELD) {
        Some(Value::Array(items)) if !items.is_empty() => Some(items.len()),
        _ => None,
    })
}
