//! Stream-based data source.
//!
//! Speaks the newline-delimited JSON protocol over an async byte stream,
//! usually a TCP connection to a measurement server.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::protocol::{decode_line, encode_request};
use super::{ClientRequest, DataSource, FeedEvent};
use crate::error::MalformedEvent;

/// Queries written to the server and not yet answered, plus the last error.
#[derive(Debug, Default)]
struct Shared {
    pending: Vec<ClientRequest>,
    last_error: Option<String>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A data source talking to a server over an async stream.
///
/// Spawns a reader task that decodes one message per line and a writer task
/// that encodes queries. If the connection ends while queries are still
/// outstanding, each of them is answered with a failure so the dashboard
/// leaves its loading state.
///
/// # Example with an in-memory stream
///
/// ```
/// use metricwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let (client, _server) = tokio::io::duplex(1024);
/// let (reader, writer) = tokio::io::split(client);
/// let source = StreamSource::spawn(reader, writer, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    requests: mpsc::UnboundedSender<ClientRequest>,
    events: mpsc::Receiver<FeedEvent>,
    description: String,
    shared: Arc<Mutex<Shared>>,
}

impl StreamSource {
    /// Connect to a server over TCP.
    pub async fn connect<A>(addr: A, description: &str) -> std::io::Result<Self>
    where
        A: ToSocketAddrs,
    {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self::spawn(reader, writer, description))
    }

    /// Spawn the reader and writer tasks over the given halves.
    pub fn spawn<R, W>(reader: R, writer: W, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Shared::default()));

        tokio::spawn(read_loop(reader, event_tx.clone(), shared.clone()));
        tokio::spawn(write_loop(writer, req_rx, event_tx, shared.clone()));

        Self {
            requests: req_tx,
            events: event_rx,
            description: format!("stream: {}", description),
            shared,
        }
    }
}

async fn read_loop<R>(reader: R, tx: mpsc::Sender<FeedEvent>, shared: Arc<Mutex<Shared>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let reason = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break "Connection closed".to_string(),
            Ok(_) => {
                // A line that is not UTF-8 is one malformed event, not a broken stream.
                let event = match std::str::from_utf8(&buf) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => decode_line(line),
                    Err(e) => FeedEvent::Malformed(MalformedEvent::Unparseable(e.to_string())),
                };
                settle(&shared, &event);
                if tx.send(event).await.is_err() {
                    // Receiver dropped
                    return;
                }
            }
            Err(e) => break format!("Read error: {}", e),
        }
    };

    warn!(reason = %reason, "measurement stream ended");
    let outstanding = {
        let mut state = lock(&shared);
        state.last_error = Some(reason.clone());
        std::mem::take(&mut state.pending)
    };
    for request in outstanding {
        if tx.send(request.failure(reason.clone())).await.is_err() {
            break;
        }
    }
}

/// Drop the pending query an answer belongs to.
fn settle(shared: &Mutex<Shared>, event: &FeedEvent) {
    let answered = match event {
        FeedEvent::Catalog(_) => "getMetrics",
        FeedEvent::History(_) => "getMultipleMeasurements",
        FeedEvent::Measurement(_) | FeedEvent::Malformed(_) => return,
    };
    let mut state = lock(shared);
    if let Some(pos) = state.pending.iter().position(|r| r.name() == answered) {
        state.pending.remove(pos);
    }
}

async fn write_loop<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<ClientRequest>,
    tx: mpsc::Sender<FeedEvent>,
    shared: Arc<Mutex<Shared>>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(request) = rx.recv().await {
        let line = match encode_request(&request) {
            Ok(line) => line,
            Err(e) => {
                let _ = tx.send(request.failure(e.to_string())).await;
                continue;
            }
        };

        lock(&shared).pending.push(request.clone());
        let written = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await;

        match written {
            Ok(()) => debug!(query = request.name(), "query sent"),
            Err(e) => {
                let reason = format!("Write error: {}", e);
                {
                    let mut state = lock(&shared);
                    state.pending.retain(|r| r != &request);
                    state.last_error = Some(reason.clone());
                }
                if tx.send(request.failure(reason)).await.is_err() {
                    break;
                }
            }
        }
    }
}

impl DataSource for StreamSource {
    fn request(&mut self, request: ClientRequest) {
        if let Err(e) = self.requests.send(request) {
            lock(&self.shared).last_error = Some(format!("Writer stopped: {}", e));
        }
    }

    fn poll(&mut self) -> Option<FeedEvent> {
        // Try to receive without blocking
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                let mut state = lock(&self.shared);
                if state.last_error.is_none() {
                    state.last_error = Some("Stream disconnected".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        lock(&self.shared).last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use tokio::io::{duplex, split, DuplexStream, ReadHalf, WriteHalf};

    fn pair() -> (StreamSource, BufReader<ReadHalf<DuplexStream>>, WriteHalf<DuplexStream>) {
        let (client, server) = duplex(64 * 1024);
        let (client_r, client_w) = split(client);
        let (server_r, server_w) = split(server);
        let source = StreamSource::spawn(client_r, client_w, "test");
        (source, BufReader::new(server_r), server_w)
    }

    async fn settle_tasks() {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_query_is_written_as_a_line() {
        let (mut source, mut server_r, _server_w) = pair();
        source.request(ClientRequest::GetMetrics);

        let mut line = String::new();
        server_r.read_line(&mut line).await.unwrap();
        assert_eq!(line, "{\"query\":\"getMetrics\"}\n");
    }

    #[tokio::test]
    async fn test_answers_and_live_events_are_polled_in_order() {
        let (mut source, _server_r, mut server_w) = pair();
        server_w
            .write_all(b"{\"getMetrics\":[\"cpu\"]}\n\n{\"newMeasurement\":{\"metric\":\"cpu\",\"at\":1,\"value\":2}}\n")
            .await
            .unwrap();
        settle_tasks().await;

        assert_eq!(source.poll(), Some(FeedEvent::Catalog(Ok(vec!["cpu".to_string()]))));
        assert!(matches!(source.poll(), Some(FeedEvent::Measurement(_))));
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_bad_line_does_not_end_stream() {
        let (mut source, _server_r, mut server_w) = pair();
        server_w.write_all(b"garbage\n{\"getMetrics\":[]}\n").await.unwrap();
        settle_tasks().await;

        assert!(matches!(source.poll(), Some(FeedEvent::Malformed(_))));
        assert_eq!(source.poll(), Some(FeedEvent::Catalog(Ok(vec![]))));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_dropped_and_feed_continues() {
        let (mut source, _server_r, mut server_w) = pair();
        server_w
            .write_all(b"{\"newMeasurement\":{\"metric\":\"cpu\",\"at\":1,\"value\":1}}\n")
            .await
            .unwrap();
        server_w.write_all(b"\xff\xfe garbage\n").await.unwrap();
        server_w
            .write_all(b"{\"newMeasurement\":{\"metric\":\"cpu\",\"at\":2,\"value\":2}}\n")
            .await
            .unwrap();
        settle_tasks().await;

        let mut live = Vec::new();
        let mut malformed = 0;
        while let Some(event) = source.poll() {
            match event {
                FeedEvent::Measurement(raw) => live.push(raw.at),
                FeedEvent::Malformed(_) => malformed += 1,
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(live, vec![Some(1), Some(2)]);
        assert_eq!(malformed, 1);
        assert_eq!(source.error(), None);
    }

    #[tokio::test]
    async fn test_close_fails_outstanding_queries() {
        let (mut source, server_r, server_w) = pair();
        source.request(ClientRequest::GetMetrics);
        settle_tasks().await;

        drop(server_w);
        drop(server_r);
        settle_tasks().await;

        assert_eq!(
            source.poll(),
            Some(FeedEvent::Catalog(Err(LoadError::Catalog("Connection closed".into()))))
        );
        assert_eq!(source.error().as_deref(), Some("Connection closed"));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let (source, _r, _w) = pair();
        assert_eq!(source.description(), "stream: test");
    }
}
