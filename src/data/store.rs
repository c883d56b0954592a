//! The series store: metric id to its append-only time series.
//!
//! All writes arrive as [`StoreCommand`] values and are applied in one place,
//! so every mutation is visible to readers as a whole.

use std::collections::BTreeMap;

use super::measurement::{Measurement, MetricId};

/// Measurements of one metric in arrival order.
///
/// Arrival order is not necessarily `at` order; readers that need sorted
/// data sort at read time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    entries: Vec<Measurement>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.entries
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.entries.last()
    }

    fn push(&mut self, m: Measurement) {
        self.entries.push(m);
    }

    /// Put `history` in front of whatever arrived before it.
    fn prepend(&mut self, mut history: Vec<Measurement>) {
        history.append(&mut self.entries);
        self.entries = history;
    }
}

/// A mutation of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    /// Seed from the historical snapshot. Honoured once per store.
    Seed(BTreeMap<MetricId, Vec<Measurement>>),
    /// Make a metric eligible for live appends, starting empty.
    Enroll(MetricId),
    /// Append one accepted live measurement at the tail of its series.
    Append(Measurement),
}

/// What applying a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Seeded { metrics: usize },
    Enrolled,
    Appended,
    /// The store already holds the snapshot; the new one was discarded.
    SeedDiscarded,
    /// The metric was already a key.
    AlreadyEnrolled,
    /// The metric is not a key; nothing changed.
    NotEnrolled,
}

/// Mapping from metric id to time series; the only copy rendering reads.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<MetricId, TimeSeries>,
    hydrated: bool,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the historical snapshot has been applied.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether `metric` is a key, i.e. eligible for live appends.
    pub fn is_enrolled(&self, metric: &str) -> bool {
        self.series.contains_key(metric)
    }

    pub fn get(&self, metric: &str) -> Option<&TimeSeries> {
        self.series.get(metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricId> {
        self.series.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricId, &TimeSeries)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of measurements held across all series.
    pub fn total_measurements(&self) -> usize {
        self.series.values().map(TimeSeries::len).sum()
    }

    /// Apply a command. Existing entries are never removed or changed.
    pub fn apply(&mut self, command: StoreCommand) -> Applied {
        match command {
            StoreCommand::Seed(snapshot) => {
                if self.hydrated {
                    return Applied::SeedDiscarded;
                }
                self.hydrated = true;
                let metrics = snapshot.len();
                for (metric, history) in snapshot {
                    self.series.entry(metric).or_default().prepend(history);
                }
                Applied::Seeded { metrics }
            }
            StoreCommand::Enroll(metric) => {
                if self.series.contains_key(&metric) {
                    Applied::AlreadyEnrolled
                } else {
                    self.series.insert(metric, TimeSeries::new());
                    Applied::Enrolled
                }
            }
            StoreCommand::Append(m) => match self.series.get_mut(&m.metric) {
                Some(series) => {
                    series.push(m);
                    Applied::Appended
                }
                None => Applied::NotEnrolled,
            },
        }
    }
}
