//! Newline-delimited JSON messages exchanged with a measurement server.
//!
//! Requests carry a `query` tag; responses are keyed by the query they
//! answer, and live events arrive as `newMeasurement` objects.

use serde::{Deserialize, Serialize};

use super::FeedEvent;
use crate::data::{MetricHistory, MetricId, RawMeasurement};
use crate::data::measurement::HistoryQuery;
use crate::error::{LoadError, MalformedEvent};

/// A query sent to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "camelCase")]
pub enum ClientRequest {
    /// List every known metric.
    GetMetrics,
    /// Fetch history for each `{metricName, after}` pair.
    GetMultipleMeasurements { input: Vec<HistoryQuery> },
}

impl ClientRequest {
    /// Wire name of the query, as echoed back in error responses.
    pub fn name(&self) -> &'static str {
        match self {
            ClientRequest::GetMetrics => "getMetrics",
            ClientRequest::GetMultipleMeasurements { .. } => "getMultipleMeasurements",
        }
    }

    /// The failure to report when this query cannot be answered.
    pub fn failure(&self, message: impl Into<String>) -> FeedEvent {
        let message = message.into();
        match self {
            ClientRequest::GetMetrics => FeedEvent::Catalog(Err(LoadError::Catalog(message))),
            ClientRequest::GetMultipleMeasurements { .. } => {
                FeedEvent::History(Err(LoadError::Hydration(message)))
            }
        }
    }
}

/// An error answer to a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    pub query: String,
    pub message: String,
}

/// A message pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMessage {
    GetMetrics(Vec<MetricId>),
    GetMultipleMeasurements(Vec<MetricHistory>),
    NewMeasurement(RawMeasurement),
    Error(QueryError),
}

impl From<ServerMessage> for FeedEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::GetMetrics(names) => FeedEvent::Catalog(Ok(names)),
            ServerMessage::GetMultipleMeasurements(histories) => FeedEvent::History(Ok(histories)),
            ServerMessage::NewMeasurement(raw) => FeedEvent::Measurement(raw),
            ServerMessage::Error(err) if err.query == "getMultipleMeasurements" => {
                FeedEvent::History(Err(LoadError::Hydration(err.message)))
            }
            ServerMessage::Error(err) => FeedEvent::Catalog(Err(LoadError::Catalog(err.message))),
        }
    }
}

/// Decode one line from the server. Anything unparseable is a malformed event.
pub fn decode_line(line: &str) -> FeedEvent {
    match serde_json::from_str::<ServerMessage>(line.trim()) {
        Ok(message) => message.into(),
        Err(e) => FeedEvent::Malformed(MalformedEvent::Unparseable(e.to_string())),
    }
}

/// Encode a request as one line, newline included.
pub fn encode_request(request: &ClientRequest) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}
