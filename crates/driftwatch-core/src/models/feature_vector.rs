use serde::{Deserialize, Serialize};

use super::Datum;
use crate::errors::{DriftwatchError, DriftwatchResult};

/// Row-major `rows x dims` numeric matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    rows: usize,
    dims: usize,
    data: Vec<f64>,
}

impl FeatureVector {
    /// Build from per-row vectors. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> DriftwatchResult<Self> {
        let dims = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * dims);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dims {
                return Err(DriftwatchError::invalid_value(
                    "feature vector",
                    format!("row {i} has {} dims, expected {dims}", row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            dims,
            data,
        })
    }

    /// Build from measured data, one row per datum.
    pub fn from_data(data: &[Datum], context: &str) -> DriftwatchResult<Self> {
        let rows = data
            .iter()
            .map(|d| d.to_vector(context))
            .collect::<DriftwatchResult<Vec<_>>>()?;
        Self::from_rows(&rows)
    }

    pub fn single(row: Vec<f64>) -> Self {
        Self {
            rows: 1,
            dims: row.len(),
            data: row,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.dims)
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dims..(i + 1) * self.dims]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Column `d` across all rows.
    pub fn column(&self, d: usize) -> Vec<f64> {
        self.rows().map(|r| r[d]).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
