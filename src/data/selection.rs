//! The set of metrics the user has chosen to display.

use super::measurement::MetricId;

/// Ordered selection, no duplicates.
///
/// Selection order is display order. Deselecting only hides a metric; its
/// series stays in the store and keeps receiving live data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    metrics: Vec<MetricId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `metric` at the end. Returns false if it was already selected.
    pub fn select(&mut self, metric: &str) -> bool {
        if self.contains(metric) {
            return false;
        }
        self.metrics.push(metric.to_string());
        true
    }

    /// Remove `metric`. Returns false if it was not selected.
    pub fn deselect(&mut self, metric: &str) -> bool {
        let before = self.metrics.len();
        self.metrics.retain(|m| m != metric);
        self.metrics.len() != before
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    pub fn as_slice(&self) -> &[MetricId] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
