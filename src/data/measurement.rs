//! Measurement types shared by every boundary.
//!
//! These match the JSON shapes used on the wire: camelCase query fields,
//! epoch-millisecond timestamps, and a free-form unit string.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::MalformedEvent;

/// Opaque, unique name of a measurable quantity.
pub type MetricId = String;

/// Epoch milliseconds, as assigned by the producer.
pub type Timestamp = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// One timestamped sample of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub metric: MetricId,
    pub at: Timestamp,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl Measurement {
    pub fn new(metric: impl Into<MetricId>, at: Timestamp, value: f64, unit: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            at,
            value,
            unit: unit.into(),
        }
    }
}

/// A live-feed payload before validation.
///
/// Every field is optional so that a partial event still deserializes and
/// can be rejected on its own rather than failing the whole line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl RawMeasurement {
    /// Validate the payload into a [`Measurement`].
    ///
    /// `metric`, `at` and `value` are required; a missing unit becomes empty.
    pub fn validate(self) -> Result<Measurement, MalformedEvent> {
        let metric = self
            .metric
            .filter(|m| !m.is_empty())
            .ok_or(MalformedEvent::MissingField("metric"))?;
        let value = self.value.ok_or(MalformedEvent::MissingField("value"))?;
        let at = self.at.ok_or(MalformedEvent::MissingField("at"))?;

        Ok(Measurement {
            metric,
            at,
            value,
            unit: self.unit.unwrap_or_default(),
        })
    }
}

impl From<Measurement> for RawMeasurement {
    fn from(m: Measurement) -> Self {
        Self {
            metric: Some(m.metric),
            at: Some(m.at),
            value: Some(m.value),
            unit: Some(m.unit),
        }
    }
}

/// One entry of the bulk history request: a metric and its lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub metric_name: MetricId,
    pub after: Timestamp,
}

/// One entry of the bulk history response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    pub metric: MetricId,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}
