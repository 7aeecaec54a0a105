use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DriftwatchError, DriftwatchResult};

/// One measured value for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Bool(bool),
    Scalar(f64),
    Vector(Vec<f64>),
    Text(String),
}

impl Datum {
    /// Convert a JSON value. Nested numeric arrays are flattened row-major.
    pub fn from_json(value: &Value, context: &str) -> DriftwatchResult<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Scalar)
                .ok_or_else(|| DriftwatchError::invalid_value(context, "number out of range")),
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Array(_) => {
                let mut out = Vec::new();
                flatten_numeric(value, context, &mut out)?;
                Ok(Self::Vector(out))
            }
            Value::Null => Err(DriftwatchError::invalid_value(context, "null value")),
            Value::Object(_) => Err(DriftwatchError::invalid_value(
                context,
                "objects cannot be measured directly",
            )),
        }
    }

    /// Scalar view: booleans map to 0/1, single-element vectors unwrap.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Scalar(x) => Some(*x),
            Self::Vector(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Scalar(x) => Some(*x != 0.0),
            _ => None,
        }
    }

    /// Numeric vector view, used by distances and bucketing.
    pub fn to_vector(&self, context: &str) -> DriftwatchResult<Vec<f64>> {
        match self {
            Self::Bool(_) | Self::Scalar(_) => Ok(vec![self.as_f64().unwrap_or_default()]),
            Self::Vector(v) => Ok(v.clone()),
            Self::Text(_) => Err(DriftwatchError::invalid_value(
                context,
                "expected a numeric value, found text",
            )),
        }
    }

    /// Number of numeric dimensions (text counts as one categorical dimension).
    pub fn dims(&self) -> usize {
        match self {
            Self::Vector(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Stable string form used for labels and categorical buckets.
    pub fn label(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Scalar(x) if x.fract() == 0.0 && x.is_finite() => format!("{}", *x as i64),
            Self::Scalar(x) => x.to_string(),
            Self::Vector(v) => format!("{v:?}"),
            Self::Text(s) => s.clone(),
        }
    }
}

fn flatten_numeric(value: &Value, context: &str, out: &mut Vec<f64>) -> DriftwatchResult<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_numeric(item, context, out)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            let x = n
                .as_f64()
                .ok_or_else(|| DriftwatchError::invalid_value(context, "number out of range"))?;
            out.push(x);
            Ok(())
        }
        Value::Bool(b) => {
            out.push(if *b { 1.0 } else { 0.0 });
            Ok(())
        }
        _ => Err(DriftwatchError::invalid_value(
            context,
            "arrays must contain only numbers",
        )),
    }
}

impl From<f64> for Datum {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<f64>> for Datum {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
