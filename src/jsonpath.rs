//! Property paths for the `json` operator
//!
//! Supports:
//! - a.b.c (dot notation, optional `$.` prefix)
//! - a[0].b (array index)
//! - items.0 (numeric segment: array index, or object key "0")
//!
//! Does NOT support filters, wildcards or slices.

use crate::error::BindError;
use crate::value::Value;

/// A parsed path segment
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: .field
    Field(String),
    /// Array index access: [0] or .0
    Index(usize),
}

/// Parse a dotted path into segments
///
/// Examples:
/// - "data.temp" → [Field("data"), Field("temp")]
/// - "items[0].name" → [Field("items"), Index(0), Field("name")]
pub fn parse(path: &str) -> Result<Vec<Segment>, BindError> {
    let path = path.trim();
    let path = if let Some(stripped) = path.strip_prefix("$.") {
        stripped
    } else if path == "$" {
        return Ok(vec![]);
    } else {
        path
    };

    if path.is_empty() {
        return Ok(vec![]);
    }

    let unsupported = || BindError::JsonPathUnsupported {
        path: path.to_string(),
    };

    let mut segments = Vec::new();

    for part in path.split('.') {
        if part.is_empty() {
            return Err(unsupported());
        }

        if let Some(bracket_pos) = part.find('[') {
            let field = &part[..bracket_pos];
            if !field.is_empty() {
                segments.push(Segment::Field(field.to_string()));
            }

            // one or more [n] suffixes: matrix[1][2]
            let mut rest = &part[bracket_pos..];
            while !rest.is_empty() {
                let inner = rest.strip_prefix('[').ok_or_else(unsupported)?;
                let close = inner.find(']').ok_or_else(unsupported)?;
                let index: usize = inner[..close].trim().parse().map_err(|_| unsupported())?;
                segments.push(Segment::Index(index));
                rest = &inner[close + 1..];
            }
        } else if let Ok(index) = part.parse::<usize>() {
            segments.push(Segment::Index(index));
        } else {
            segments.push(Segment::Field(part.to_string()));
        }
    }

    Ok(segments)
}

/// Walk `segments` from `value`, returning the addressed value if present
pub fn apply<'v>(value: &'v Value, segments: &[Segment]) -> Option<&'v Value> {
    let mut current = value;

    for segment in segments {
        current = match (segment, current) {
            (Segment::Field(name), Value::Object(map)) => map.get(name)?,
            (Segment::Index(idx), Value::Array(items)) => items.get(*idx)?,
            (Segment::Index(idx), Value::Object(map)) => map.get(&idx.to_string())?,
            _ => return None,
        };
    }

    Some(current)
}

/// Parse and apply in one step
pub fn resolve(value: &Value, path: &str) -> Result<Option<Value>, BindError> {
    let segments = parse(path)?;
    Ok(apply(value, &segments).cloned())
}
