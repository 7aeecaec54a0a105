use serde::{Deserialize, Serialize};

/// A value stored in the state cache for one aggregate id and column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CacheValue {
    Count(u64),
    Values(Vec<f64>),
}

impl CacheValue {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(c) => Some(*c),
            Self::Values(_) => None,
        }
    }

    pub fn as_values(&self) -> Option<&[f64]> {
        match self {
            Self::Values(v) => Some(v),
            Self::Count(_) => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Count(_) => true,
            Self::Values(v) => v.iter().all(|x| x.is_finite()),
        }
    }
}

impl From<u64> for CacheValue {
    fn from(c: u64) -> Self {
        Self::Count(c)
    }
}

impl From<Vec<f64>> for CacheValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Values(v)
    }
}
