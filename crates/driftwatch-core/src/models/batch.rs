//! Batches of model inputs, outputs, and ground truths.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object: one record of named fields.
pub type Record = serde_json::Map<String, Value>;

/// One logged prediction: inputs, output, optional ground truth, and extra fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Row identifier (unique per logged prediction).
    pub id: String,
    /// Model input features.
    #[serde(default)]
    pub inputs: Record,
    /// Model output, if logged.
    #[serde(default)]
    pub output: Option<Value>,
    /// Ground truth, once it is known.
    #[serde(default)]
    pub ground_truth: Option<Value>,
    /// Side-channel fields such as aggregate ids, counters, and tags.
    #[serde(default)]
    pub extra: Record,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn with_output(mut self, value: impl Into<Value>) -> Self {
        self.output = Some(value.into());
        self
    }

    pub fn with_ground_truth(mut self, value: impl Into<Value>) -> Self {
        self.ground_truth = Some(value.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// An ordered list of rows. Trackers process rows in this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    /// True when every row carries a ground truth.
    pub fn has_ground_truth(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.ground_truth.is_some())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl From<Vec<Row>> for Batch {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
