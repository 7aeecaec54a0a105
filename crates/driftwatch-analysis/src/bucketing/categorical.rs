use std::collections::HashMap;

use super::Cluster;

/// One bucket per distinct value, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategoricalBuckets {
    categories: Vec<String>,
    index: HashMap<String, usize>,
    reference_counts: Vec<usize>,
}

impl CategoricalBuckets {
    pub fn fit(values: &[String]) -> Self {
        let mut buckets = Self::default();
        for value in values {
            let idx = buckets.assign(value);
            buckets.reference_counts[idx] += 1;
        }
        buckets
    }

    /// Index of `value`, appending a new bucket when it was never seen.
    pub fn assign(&mut self, value: &str) -> usize {
        if let Some(idx) = self.index.get(value) {
            return *idx;
        }
        let idx = self.categories.len();
        self.categories.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        self.reference_counts.push(0);
        idx
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.reference_counts
            .iter()
            .enumerate()
            .map(|(i, count)| Cluster {
                centroid: vec![i as f64],
                spread: 0.0,
                count: *count,
            })
            .collect()
    }
}
