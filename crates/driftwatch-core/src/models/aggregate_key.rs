use std::fmt;

use serde::{Deserialize, Serialize};

use super::Datum;
use crate::errors::{DriftwatchError, DriftwatchResult};

/// 2^63, the first integral float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Opaque identifier of a tracked entity (user, session, document...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateKey {
    Int(i64),
    Text(String),
}

impl AggregateKey {
    /// Integral scalars become `Int`, strings become `Text`.
    pub fn from_datum(datum: &Datum) -> DriftwatchResult<Self> {
        match datum {
            Datum::Scalar(x) if x.is_finite() && x.fract() == 0.0 => {
                if *x < -I64_BOUND || *x >= I64_BOUND {
                    return Err(DriftwatchError::invalid_value(
                        "aggregate id",
                        format!("integer id {x} is outside the 64-bit range"),
                    ));
                }
                Ok(Self::Int(*x as i64))
            }
            Datum::Bool(b) => Ok(Self::Int(i64::from(*b))),
            Datum::Text(s) => Ok(Self::Text(s.clone())),
            other => Err(DriftwatchError::invalid_value(
                "aggregate id",
                format!("expected an integer or string, found {other:?}"),
            )),
        }
    }

    /// Stable string form, used as the storage key by persistent caches.
    pub fn encode(&self) -> String {
        match self {
            Self::Int(i) => format!("i:{i}"),
            Self::Text(s) => format!("s:{s}"),
        }
    }

    pub fn decode(raw: &str) -> Option<Self> {
        if let Some(rest) = raw.strip_prefix("i:") {
            rest.parse().ok().map(Self::Int)
        } else {
            raw.strip_prefix("s:").map(|s| Self::Text(s.to_string()))
        }
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AggregateKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for AggregateKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AggregateKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
