//! ADWIN: adaptive windowing over an exponential histogram.
//!
//! The window is stored as rows of buckets, row `i` holding buckets that
//! each summarise `2^i` observations. Within a row the newest bucket sits at
//! the front; older rows hold older data. Every `clock` updates the window is
//! scanned from oldest to newest for a split point whose two sub-window means
//! differ by more than the Hoeffding/Bernstein bound, and the oldest buckets
//! are dropped until no such split remains.

use std::collections::VecDeque;

use driftwatch_core::config::AdwinParams;

use super::{ChangeDetector, DetectorState};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    total: f64,
    /// Sum of squared deviations from the bucket mean.
    variance: f64,
}

#[derive(Debug, Clone)]
pub struct Adwin {
    params: AdwinParams,
    rows: Vec<VecDeque<Bucket>>,
    width: u64,
    total: f64,
    variance: f64,
    tick: u64,
}

impl Adwin {
    pub fn new(params: AdwinParams) -> Self {
        Self {
            params,
            rows: Vec::new(),
            width: 0,
            total: 0.0,
            variance: 0.0,
            tick: 0,
        }
    }

    /// Current window length.
    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn mean(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    /// Window variance (population).
    pub fn variance(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.variance / self.width as f64
        }
    }

    fn insert(&mut self, x: f64) {
        if self.width > 0 {
            let mean = self.total / self.width as f64;
            let w = self.width as f64;
            self.variance += w * (x - mean) * (x - mean) / (w + 1.0);
        }
        self.width += 1;
        self.total += x;

        if self.rows.is_empty() {
            self.rows.push(VecDeque::new());
        }
        self.rows[0].push_front(Bucket {
            total: x,
            variance: 0.0,
        });
        self.compress();
    }

    /// Merge the two oldest buckets of any overfull row into the next row.
    fn compress(&mut self) {
        let mut level = 0;
        while level < self.rows.len() {
            if self.rows[level].len() <= self.params.max_buckets {
                break;
            }
            let (Some(older), Some(newer)) = (self.rows[level].pop_back(), self.rows[level].pop_back())
            else {
                break;
            };
            let n = (1u64 << level) as f64;
            let diff = older.total / n - newer.total / n;
            let merged = Bucket {
                total: older.total + newer.total,
                variance: older.variance + newer.variance + n * n * diff * diff / (2.0 * n),
            };
            if level + 1 == self.rows.len() {
                self.rows.push(VecDeque::new());
            }
            self.rows[level + 1].push_front(merged);
            level += 1;
        }
    }

    fn delete_oldest(&mut self) {
        let Some(level) = self.rows.iter().rposition(|r| !r.is_empty()) else {
            return;
        };
        let Some(bucket) = self.rows[level].pop_back() else {
            return;
        };
        let n = (1u64 << level) as f64;
        self.width -= 1u64 << level;
        self.total -= bucket.total;
        if self.width == 0 {
            self.variance = 0.0;
        } else {
            let w = self.width as f64;
            let diff = bucket.total / n - self.total / w;
            self.variance -= bucket.variance + n * w * diff * diff / (n + w);
            self.variance = self.variance.max(0.0);
        }
        while self.rows.last().is_some_and(VecDeque::is_empty) {
            self.rows.pop();
        }
    }

    /// Scan oldest-to-newest for a split whose means differ significantly.
    fn find_cut(&self) -> bool {
        let min_len = self.params.min_window_length.max(1);
        let window_var = self.variance();
        let dd = (2.0 * (self.width as f64).ln() / self.params.delta).ln();

        let (mut n0, mut u0) = (0u64, 0.0);
        let (mut n1, mut u1) = (self.width, self.total);
        for (level, row) in self.rows.iter().enumerate().rev() {
            let size = 1u64 << level;
            for bucket in row.iter().rev() {
                n0 += size;
                n1 -= size;
                u0 += bucket.total;
                u1 -= bucket.total;
                if n1 < min_len {
                    return false;
                }
                if n0 < min_len {
                    continue;
                }
                let m = 1.0 / (n0 - min_len + 1) as f64 + 1.0 / (n1 - min_len + 1) as f64;
                let epsilon = (2.0 * m * window_var * dd).sqrt() + 2.0 / 3.0 * dd * m;
                if (u0 / n0 as f64 - u1 / n1 as f64).abs() > epsilon {
                    return true;
                }
            }
        }
        false
    }
}

impl ChangeDetector for Adwin {
    fn update(&mut self, x: f64) -> DetectorState {
        self.insert(x);
        self.tick += 1;

        let clock = u64::from(self.params.clock.max(1));
        if self.tick % clock != 0 || self.width <= self.params.grace_period {
            return DetectorState::Stable;
        }

        let mut drifted = false;
        while self.width > 1 && self.find_cut() {
            self.delete_oldest();
            drifted = true;
        }
        if drifted {
            tracing::debug!(width = self.width, mean = self.mean(), "adwin window cut");
            DetectorState::Drift
        } else {
            DetectorState::Stable
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.params.clone());
    }

    fn observations(&self) -> u64 {
        self.width
    }
}
