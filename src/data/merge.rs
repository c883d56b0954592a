//! Live merge of incoming measurement events.
//!
//! Each event is judged against the store as it is at receipt time: a metric
//! enrolled a moment ago is eligible for the very next event.

use tracing::{debug, trace};

use super::measurement::RawMeasurement;
use super::store::{SeriesStore, StoreCommand};
use crate::error::MalformedEvent;

/// Result of offering one event to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Accepted; apply the command to the store.
    Accept(StoreCommand),
    /// Metric is not enrolled. Expected filtering, not a fault.
    Unenrolled,
    /// Payload could not be validated.
    Malformed(MalformedEvent),
}

/// Running counts of what the engine has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub accepted: u64,
    pub unenrolled: u64,
    pub malformed: u64,
}

/// Decides whether live events are appended.
///
/// No reordering and no deduplication: accepted events go to the tail of
/// their series in delivery order, duplicate timestamps included.
#[derive(Debug, Default)]
pub struct LiveMerge {
    stats: MergeStats,
}

impl LiveMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// Judge one event against the current store.
    pub fn on_measurement(&mut self, event: RawMeasurement, store: &SeriesStore) -> MergeOutcome {
        let measurement = match event.validate() {
            Ok(m) => m,
            Err(e) => return self.on_malformed(e),
        };

        if !store.is_enrolled(&measurement.metric) {
            self.stats.unenrolled += 1;
            trace!(metric = %measurement.metric, "live event for unenrolled metric dropped");
            return MergeOutcome::Unenrolled;
        }

        self.stats.accepted += 1;
        MergeOutcome::Accept(StoreCommand::Append(measurement))
    }

    /// Record an event that never made it to a measurement.
    pub fn on_malformed(&mut self, error: MalformedEvent) -> MergeOutcome {
        self.stats.malformed += 1;
        debug!(error = %error, "malformed live event dropped");
        MergeOutcome::Malformed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::measurement::Measurement;
    use crate::data::store::Applied;

    fn raw(metric: &str, at: i64, value: f64) -> RawMeasurement {
        Measurement::new(metric, at, value, "%").into()
    }

    fn store_with(metric: &str) -> SeriesStore {
        let mut store = SeriesStore::new();
        store.apply(StoreCommand::Enroll(metric.to_string()));
        store
    }

    #[test]
    fn test_accepts_enrolled_metric() {
        let store = store_with("cpu");
        let mut merge = LiveMerge::new();
        let outcome = merge.on_measurement(raw("cpu", 1, 1.0), &store);
        assert_eq!(
            outcome,
            MergeOutcome::Accept(StoreCommand::Append(Measurement::new("cpu", 1, 1.0, "%")))
        );
        assert_eq!(merge.stats().accepted, 1);
    }

    #[test]
    fn test_drops_unenrolled_metric() {
        let store = store_with("cpu");
        let mut merge = LiveMerge::new();
        assert_eq!(merge.on_measurement(raw("disk", 1, 1.0), &store), MergeOutcome::Unenrolled);
        assert_eq!(merge.stats(), MergeStats { accepted: 0, unenrolled: 1, malformed: 0 });
    }

    #[test]
    fn test_malformed_does_not_stop_later_events() {
        let mut store = store_with("cpu");
        let mut merge = LiveMerge::new();

        let bad = RawMeasurement {
            metric: Some("cpu".into()),
            ..Default::default()
        };
        assert!(matches!(merge.on_measurement(bad, &store), MergeOutcome::Malformed(_)));

        if let MergeOutcome::Accept(cmd) = merge.on_measurement(raw("cpu", 2, 2.0), &store) {
            assert_eq!(store.apply(cmd), Applied::Appended);
        } else {
            panic!("expected accept");
        }
        assert_eq!(store.get("cpu").unwrap().len(), 1);
        assert_eq!(merge.stats().malformed, 1);
    }

    #[test]
    fn test_enrollment_is_checked_at_receipt() {
        let mut store = SeriesStore::new();
        let mut merge = LiveMerge::new();
        assert_eq!(merge.on_measurement(raw("mem", 1, 1.0), &store), MergeOutcome::Unenrolled);

        store.apply(StoreCommand::Enroll("mem".into()));
        assert!(matches!(merge.on_measurement(raw("mem", 2, 2.0), &store), MergeOutcome::Accept(_)));
    }
}
