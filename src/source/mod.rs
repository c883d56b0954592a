//! Data source abstraction for the measurement transport.
//!
//! A source accepts fire-and-forget queries and hands back their answers,
//! along with live measurement events, through non-blocking polling. How
//! the answers are obtained (a TCP server, a fixture file, an in-process
//! channel) is up to the implementation.

mod channel;
mod file;
pub mod protocol;
mod stream;

pub use channel::{ChannelSource, FeedHandle};
pub use file::{Fixture, FileSource};
pub use protocol::{ClientRequest, ServerMessage};
pub use stream::StreamSource;

use std::fmt::Debug;

use crate::data::{MetricHistory, MetricId, RawMeasurement};
use crate::error::{LoadError, MalformedEvent};

/// Something the transport delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Answer to [`ClientRequest::GetMetrics`].
    Catalog(Result<Vec<MetricId>, LoadError>),
    /// Answer to [`ClientRequest::GetMultipleMeasurements`].
    History(Result<Vec<MetricHistory>, LoadError>),
    /// One live measurement.
    Measurement(RawMeasurement),
    /// A live payload that could not be decoded at all.
    Malformed(MalformedEvent),
}

/// Trait for exchanging queries and events with a measurement transport.
///
/// # Example
///
/// ```
/// use metricwatch::{ChannelSource, ClientRequest, DataSource};
///
/// let (mut handle, mut source) = ChannelSource::create("example");
/// source.request(ClientRequest::GetMetrics);
/// assert_eq!(handle.try_next_request(), Some(ClientRequest::GetMetrics));
///
/// handle.respond_catalog(["cpu", "mem"]);
/// assert!(source.poll().is_some());
/// ```
pub trait DataSource: Send + Debug {
    /// Send a query. The answer arrives later through [`DataSource::poll`].
    fn request(&mut self, request: ClientRequest);

    /// Take the next delivered event, if any. Never blocks.
    fn poll(&mut self) -> Option<FeedEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the last transport-level error, if one occurred.
    fn error(&self) -> Option<String>;
}
