//! Data drift: a reference population bucketed once, compared against a
//! sliding window of production observations.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use driftwatch_analysis::divergence::centroid_cost_matrix;
use driftwatch_analysis::{population_stability_index, transport_cost, BucketModel, BucketingConfig};
use driftwatch_core::config::defaults;
use driftwatch_core::config::DataDriftConfig;
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AlertSeverity, Batch, Datum, DriftAlert, DriftAlertCategory};
use driftwatch_core::traits::{ILogSink, IMeasurable, Labels};
use driftwatch_observability::reference_fit_span;
use driftwatch_observability::tracing_setup::events;

use crate::context::MonitorContext;
use crate::measurables::{compute_rows, resolve_measurable};
use crate::reference::{extract_reference, load_reference_records};
use crate::report::SkippedRow;

pub const DASHBOARD: &str = "data_drift";

/// A row whose distance from its bucket, in units of the bucket's spread,
/// exceeded the configured ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeCase {
    pub row_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DataDriftReport {
    /// Rows assigned to buckets in this batch.
    pub observations: usize,
    /// Total observations after this batch.
    pub count: u64,
    /// Divergence per channel. `None` while warming up or when the window
    /// is too small to compare.
    pub divergence: Option<Vec<f64>>,
    /// Whether the monitor is in the drift state after this batch.
    pub drift: bool,
    pub alert: Option<DriftAlert>,
    pub edge_cases: Vec<EdgeCase>,
    pub skipped: Vec<SkippedRow>,
}

pub struct DataDriftMonitor {
    config: DataDriftConfig,
    measurable: Arc<dyn IMeasurable>,
    model: BucketModel,
    /// Unit transport costs between clusters (embedding mode only).
    costs: Vec<Vec<f64>>,
    sink: Arc<dyn ILogSink>,
    count: u64,
    /// Cumulative bucket counts per channel.
    counts: Vec<Vec<f64>>,
    /// `(count, counts)` snapshots taken at batch boundaries, oldest first.
    history: VecDeque<(u64, Vec<Vec<f64>>)>,
    drifting: bool,
}

impl DataDriftMonitor {
    /// Load the reference dataset and fit the bucket model.
    pub fn new(config: &DataDriftConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        let measurable = resolve_measurable(&config.measurable_args, &ctx.registry)?;
        let records = load_reference_records(&ctx.resolve_path(&config.reference_dataset))?;
        let reference = extract_reference(measurable.as_ref(), &records)?;
        Self::from_reference(config, measurable, &reference, Arc::clone(&ctx.sink))
    }

    /// Build from an already extracted reference population.
    pub fn from_reference(
        config: &DataDriftConfig,
        measurable: Arc<dyn IMeasurable>,
        reference: &[Datum],
        sink: Arc<dyn ILogSink>,
    ) -> DriftwatchResult<Self> {
        let span = reference_fit_span!(config.name, reference.len());
        let _guard = span.enter();

        let model = BucketModel::fit(
            reference,
            &BucketingConfig {
                num_buckets: config.num_buckets,
                is_embedding: config.is_embedding,
                seed: config.seed,
                max_iterations: config.max_iterations,
            },
        )?;
        let costs = if model.is_embedding() {
            centroid_cost_matrix(&model.clusters(0))
        } else {
            Vec::new()
        };
        let counts: Vec<Vec<f64>> = model.bucket_counts().into_iter().map(|n| vec![0.0; n]).collect();
        events::reference_fitted(&config.name, reference.len(), model.bucket_counts().iter().sum());

        Ok(Self {
            config: config.clone(),
            measurable,
            model,
            costs,
            sink,
            count: 0,
            history: VecDeque::from([(0, counts.clone())]),
            counts,
            drifting: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn need_ground_truth(&self) -> bool {
        false
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn model(&self) -> &BucketModel {
        &self.model
    }

    pub fn is_drifting(&self) -> bool {
        self.drifting
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<DataDriftReport> {
        let mut report = DataDriftReport::default();

        for (row, datum) in batch.iter().zip(compute_rows(self.measurable.as_ref(), batch)?) {
            match self.observe(&row.id, datum) {
                Ok(edge_case) => {
                    report.observations += 1;
                    report.edge_cases.extend(edge_case);
                }
                Err(e) if e.is_row_level() => {
                    report.skipped.push(SkippedRow::record(&self.config.name, &row.id, &e));
                }
                Err(e) => return Err(e),
            }
        }
        self.history.push_back((self.count, self.counts.clone()));
        report.count = self.count;

        if self.count >= self.config.initial_skip {
            if let Some(production) = self.production_distribution() {
                let divergence = self.divergence(&production)?;
                report.alert = self.update_drift_state(&divergence);
                report.divergence = Some(divergence);
            }
        }
        report.drift = self.drifting;
        Ok(report)
    }

    fn observe(&mut self, row_id: &str, datum: DriftwatchResult<Datum>) -> DriftwatchResult<Option<EdgeCase>> {
        let datum = datum?;
        let assignment = self.model.assign(&datum)?;
        let score = if self.config.flag_edge_cases {
            Some(self.model.outlier_score(&datum, &assignment)?)
        } else {
            None
        };

        // Categorical models grow on unseen values.
        for (channel, n) in self.model.bucket_counts().into_iter().enumerate() {
            self.counts[channel].resize(n, 0.0);
        }
        for (channel, bucket) in assignment.into_iter().enumerate() {
            self.counts[channel][bucket] += 1.0;
        }
        self.count += 1;

        Ok(score
            .filter(|s| *s > self.config.edge_case_spread_ratio)
            .map(|score| {
                events::edge_case_flagged(&self.config.name, row_id, score);
                EdgeCase {
                    row_id: row_id.to_string(),
                    score,
                }
            }))
    }

    /// Normalised counts over the last `initial_skip` observations, measured
    /// from the newest snapshot at or before `count - initial_skip`.
    fn production_distribution(&mut self) -> Option<Vec<Vec<f64>>> {
        let start = self.count.saturating_sub(self.config.initial_skip);
        while self.history.len() > 1 && self.history[1].0 <= start {
            self.history.pop_front();
        }
        let (base_count, base) = self.history.front()?;
        if self.count - base_count < defaults::MIN_WINDOW_OBSERVATIONS {
            tracing::debug!(monitor = %self.config.name, window = self.count - base_count, "window too small, skipping comparison");
            return None;
        }

        Some(
            self.counts
                .iter()
                .enumerate()
                .map(|(channel, now)| {
                    let window: Vec<f64> = now
                        .iter()
                        .enumerate()
                        .map(|(i, c)| c - base.get(channel).and_then(|b| b.get(i)).copied().unwrap_or(0.0))
                        .collect();
                    let total: f64 = window.iter().sum();
                    if total > 0.0 {
                        window.into_iter().map(|c| c / total).collect()
                    } else {
                        window
                    }
                })
                .collect(),
        )
    }

    fn metric_name(&self) -> &'static str {
        if self.model.is_embedding() {
            "earth_moving_costs_embedding"
        } else {
            "population_stability_index_scalar"
        }
    }

    fn threshold(&self) -> f64 {
        if self.model.is_embedding() {
            self.config.emd_threshold
        } else {
            self.config.psi_threshold
        }
    }

    fn divergence(&self, production: &[Vec<f64>]) -> DriftwatchResult<Vec<f64>> {
        let reference = self.model.reference_distribution();
        let divergence = production
            .iter()
            .zip(reference)
            .map(|(p, q)| {
                if self.model.is_embedding() {
                    transport_cost(p, q, &self.costs)
                } else {
                    population_stability_index(p, q, defaults::DEFAULT_PSI_EPSILON)
                }
            })
            .collect::<DriftwatchResult<Vec<f64>>>()?;

        let mut values: BTreeMap<String, f64> = divergence
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("feat_{i}"), *v))
            .collect();
        values.insert("threshold".to_string(), self.threshold());
        self.sink.add_scalars(
            &format!("{} - {}", self.config.name, self.metric_name()),
            &values,
            self.count,
            DASHBOARD,
            &Labels::new(),
        );
        Ok(divergence)
    }

    /// Alert on the transition into drift; re-arm once every channel is
    /// back under the threshold.
    fn update_drift_state(&mut self, divergence: &[f64]) -> Option<DriftAlert> {
        let threshold = self.threshold();
        let (channel, worst) = divergence
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        let metric = self.metric_name();

        if worst > threshold {
            if self.drifting {
                return None;
            }
            self.drifting = true;
            let category = if self.model.is_embedding() {
                DriftAlertCategory::EmbeddingDrift
            } else {
                DriftAlertCategory::FeatureDrift
            };
            let alert = DriftAlert::new(
                self.config.name.clone(),
                category,
                AlertSeverity::Critical,
                self.count,
                metric,
                worst,
                threshold,
                format!(
                    "{metric} of feat_{channel} is {worst:.4}, above threshold {threshold} at observation {}",
                    self.count
                ),
            );
            events::drift_detected(&self.config.name, metric, worst, threshold, self.count);
            self.sink.add_alert(&alert);
            Some(alert)
        } else {
            if self.drifting {
                self.drifting = false;
                events::drift_cleared(&self.config.name, metric, worst, self.count);
            }
            None
        }
    }
}
