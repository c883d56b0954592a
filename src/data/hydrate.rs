//! One-time historical backfill of the series store.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, warn};

use super::measurement::{now_millis, HistoryQuery, Measurement, MetricHistory, MetricId, Timestamp};
use super::store::StoreCommand;
use crate::error::LoadError;

/// Default lookback of the snapshot query.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(30 * 60);

/// Builds the bulk history query and turns its answer into a seed command.
///
/// The lower bound is fixed when the hydrator is created and never moves:
/// a long-lived session keeps asking for history relative to its own start.
#[derive(Debug, Clone)]
pub struct SnapshotHydrator {
    after: Timestamp,
    requests: u32,
}

impl SnapshotHydrator {
    /// Anchor the lookback window at `now - lookback`.
    pub fn new(lookback: Duration) -> Self {
        Self::anchored_at(now_millis() - lookback.as_millis() as Timestamp)
    }

    /// Use an explicit lower bound.
    pub fn anchored_at(after: Timestamp) -> Self {
        Self { after, requests: 0 }
    }

    /// The fixed lower bound, epoch milliseconds.
    pub fn after(&self) -> Timestamp {
        self.after
    }

    /// Number of history requests issued so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Build the query: every catalog metric paired with the same lower bound.
    pub fn request(&mut self, catalog: &[MetricId]) -> Vec<HistoryQuery> {
        self.requests += 1;
        catalog
            .iter()
            .map(|metric| HistoryQuery {
                metric_name: metric.clone(),
                after: self.after,
            })
            .collect()
    }

    /// Convert the bulk answer into a [`StoreCommand::Seed`].
    ///
    /// Metrics outside the catalog are dropped, measurements before the
    /// lower bound are dropped, and each history is ordered by `at`.
    pub fn complete(
        &self,
        result: Result<Vec<MetricHistory>, LoadError>,
        catalog: &[MetricId],
    ) -> Result<StoreCommand, LoadError> {
        let histories = result.map_err(|e| {
            warn!(error = %e, "history query failed");
            match e {
                LoadError::Hydration(msg) | LoadError::Transport(msg) | LoadError::Catalog(msg) => {
                    LoadError::Hydration(msg)
                }
            }
        })?;

        let mut snapshot: BTreeMap<MetricId, Vec<Measurement>> = BTreeMap::new();
        for history in histories {
            if !catalog.contains(&history.metric) {
                debug!(metric = %history.metric, "history for metric outside the catalog ignored");
                continue;
            }
            let metric = history.metric;
            let mut measurements: Vec<Measurement> = history
                .measurements
                .into_iter()
                .filter(|m| m.at >= self.after)
                .map(|mut m| {
                    m.metric = metric.clone();
                    m
                })
                .collect();
            measurements.sort_by_key(|m| m.at);
            snapshot.entry(metric).or_default().extend(measurements);
        }

        Ok(StoreCommand::Seed(snapshot))
    }
}

impl Default for SnapshotHydrator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK)
    }
}
