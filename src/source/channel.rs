//! Channel-based data source.
//!
//! Exchanges queries and events through in-process tokio channels. This is
//! useful when the transport lives in the same process (an embedding
//! application, a bridge task, or a test) rather than behind a socket.

use tokio::sync::mpsc;

use super::{ClientRequest, DataSource, FeedEvent};
use crate::data::{Measurement, MetricHistory, RawMeasurement};
use crate::error::LoadError;

/// A data source fed through channels.
///
/// # Example
///
/// ```
/// use metricwatch::ChannelSource;
///
/// // Create a handle/source pair
/// let (handle, source) = ChannelSource::create("in-process");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    requests: mpsc::UnboundedSender<ClientRequest>,
    events: mpsc::UnboundedReceiver<FeedEvent>,
    description: String,
    disconnected: bool,
}

/// The transport's end of a [`ChannelSource`].
///
/// Observes the queries the dashboard sends and pushes answers and live
/// measurements back.
#[derive(Debug)]
pub struct FeedHandle {
    requests: mpsc::UnboundedReceiver<ClientRequest>,
    events: mpsc::UnboundedSender<FeedEvent>,
}

impl ChannelSource {
    /// Create a connected handle/source pair.
    ///
    /// # Arguments
    ///
    /// * `source_description` - where the events come from, shown in the status bar
    pub fn create(source_description: &str) -> (FeedHandle, Self) {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let source = Self {
            requests: req_tx,
            events: event_rx,
            description: format!("channel: {}", source_description),
            disconnected: false,
        };
        let handle = FeedHandle {
            requests: req_rx,
            events: event_tx,
        };
        (handle, source)
    }
}

impl DataSource for ChannelSource {
    fn request(&mut self, request: ClientRequest) {
        // A dropped handle surfaces through `error()` on the next poll.
        let _ = self.requests.send(request);
    }

    fn poll(&mut self) -> Option<FeedEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.disconnected.then(|| "Feed disconnected".to_string())
    }
}

impl FeedHandle {
    /// Take the next query without waiting.
    pub fn try_next_request(&mut self) -> Option<ClientRequest> {
        self.requests.try_recv().ok()
    }

    /// Wait for the next query. `None` once the source is dropped.
    pub async fn next_request(&mut self) -> Option<ClientRequest> {
        self.requests.recv().await
    }

    /// Push any event. Returns false if the source has been dropped.
    pub fn send(&self, event: FeedEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn respond_catalog<I, S>(&self, metrics: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send(FeedEvent::Catalog(Ok(metrics.into_iter().map(Into::into).collect())))
    }

    pub fn respond_history(&self, histories: Vec<MetricHistory>) -> bool {
        self.send(FeedEvent::History(Ok(histories)))
    }

    pub fn fail(&self, request: &ClientRequest, message: &str) -> bool {
        self.send(request.failure(message))
    }

    pub fn fail_catalog(&self, message: &str) -> bool {
        self.send(FeedEvent::Catalog(Err(LoadError::Catalog(message.to_string()))))
    }

    pub fn push_measurement(&self, measurement: Measurement) -> bool {
        self.send(FeedEvent::Measurement(measurement.into()))
    }

    pub fn push_raw(&self, raw: RawMeasurement) -> bool {
        self.send(FeedEvent::Measurement(raw))
    }
}
