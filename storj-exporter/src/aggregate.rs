//! Null-tolerant helpers over upstream JSON.
//!
//! The dashboard API adds and drops fields between releases, so every access
//! path here answers "no value" instead of failing. Callers never need to
//! check shapes before calling in.

use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A JSON object as returned by the storage node API.
pub type Mapping = Map<String, Value>;

/// Running per-field total. Integers stay integers until a float shows up.
#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: &Value) -> Option<Total> {
        match (self, value.as_i64()) {
            (Total::Int(acc), Some(v)) => Some(
                acc.checked_add(v)
                    .map(Total::Int)
                    .unwrap_or(Total::Float(acc as f64 + v as f64)),
            ),
            _ => {
                let v = to_float(value)?;
                Some(Total::Float(self.as_f64() + v))
            }
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Total::Int(v) => v as f64,
            Total::Float(v) => v,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Total::Int(v) => Value::from(v),
            Total::Float(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

/// Sums `element[sub_key]` field by field across an ordered sequence.
///
/// Returns `default` untouched when the sequence is absent or empty, or when
/// any element lacks an object under `sub_key`; partial sums are never mixed
/// with the default. Fields missing from some elements contribute nothing,
/// and fields that do not coerce to a number are skipped.
pub fn sum_by_key<'a>(
    sequence: Option<&[Value]>,
    sub_key: &str,
    default: &'a Mapping,
) -> Cow<'a, Mapping> {
    let Some(sequence) = sequence.filter(|s| !s.is_empty()) else {
        return Cow::Borrowed(default);
    };

    // BTreeMap keeps the output independent of the order fields first appear in.
    let mut totals: BTreeMap<&str, Total> = BTreeMap::new();
    for element in sequence {
        let Some(fields) = element.get(sub_key).and_then(Value::as_object) else {
            return Cow::Borrowed(default);
        };
        for (field, value) in fields {
            let current = totals.get(field.as_str()).copied().unwrap_or(Total::Int(0));
            if let Some(next) = current.add(value) {
                totals.insert(field.as_str(), next);
            }
        }
    }

    Cow::Owned(
        totals
            .into_iter()
            .map(|(field, total)| (field.to_string(), total.into_value()))
            .collect(),
    )
}

/// Element at `index` (negative counts from the end), or `default`.
pub fn safe_index<'a, T>(sequence: Option<&'a [T]>, index: isize, default: &'a T) -> &'a T {
    let Some(sequence) = sequence else {
        return default;
    };
    let resolved = if index < 0 {
        sequence.len().checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize)
    };
    resolved.and_then(|i| sequence.get(i)).unwrap_or(default)
}

/// Walks `path` through nested objects. Stops with `None` at the first
/// missing, null or non-object step.
pub fn nested_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Best-effort numeric coercion: numbers, numeric strings and booleans.
pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Loose truthiness: null, false, zero and empty containers are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
