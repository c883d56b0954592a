//! File-based data source.
//!
//! Answers queries from a JSON fixture and replays its live section as a
//! feed. Handy for demos and for reproducing a session offline.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClientRequest, DataSource, FeedEvent};
use crate::data::{MetricHistory, MetricId, RawMeasurement};
use crate::error::MalformedEvent;

/// Contents of a fixture file.
///
/// ```json
/// {
///   "metrics": ["cpu", "mem"],
///   "history": [{"metric": "cpu", "measurements": [{"metric": "cpu", "at": 1000, "value": 10, "unit": "%"}]}],
///   "live": [{"metric": "cpu", "at": 2000, "value": 20, "unit": "%"}]
/// }
/// ```
///
/// `live` entries are kept as raw JSON so a broken entry only spoils itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub metrics: Vec<MetricId>,
    #[serde(default)]
    pub history: Vec<MetricHistory>,
    #[serde(default)]
    pub live: Vec<serde_json::Value>,
}

impl Fixture {
    /// Answer a bulk history query: each requested metric, measurements at or after its bound.
    fn answer_history(&self, input: &[crate::data::measurement::HistoryQuery]) -> Vec<MetricHistory> {
        input
            .iter()
            .filter_map(|q| {
                let history = self.history.iter().find(|h| h.metric == q.metric_name)?;
                Some(MetricHistory {
                    metric: history.metric.clone(),
                    measurements: history
                        .measurements
                        .iter()
                        .filter(|m| m.at >= q.after)
                        .cloned()
                        .collect(),
                })
            })
            .collect()
    }
}

/// A data source backed by a fixture file.
///
/// The file is read when a query arrives, so edits between runs of the
/// catalog and history queries are picked up. The live section starts
/// replaying, one entry per interval, once the catalog has been requested.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    answers: VecDeque<FeedEvent>,
    live: VecDeque<serde_json::Value>,
    replay_interval: Duration,
    last_replay: Option<Instant>,
    replaying: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            answers: VecDeque::new(),
            live: VecDeque::new(),
            replay_interval: Duration::from_secs(1),
            last_replay: None,
            replaying: false,
        }
    }

    /// Set the delay between replayed live entries.
    pub fn with_replay_interval(mut self, interval: Duration) -> Self {
        self.replay_interval = interval;
        self
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Live entries not yet replayed.
    pub fn remaining_live(&self) -> usize {
        self.live.len()
    }

    /// Read and parse the fixture.
    fn read_fixture(&mut self) -> Result<Fixture, String> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| format!("Read error: {}", e))
            .and_then(|content| {
                serde_json::from_str::<Fixture>(&content).map_err(|e| format!("Parse error: {}", e))
            });
        self.last_error = result.as_ref().err().cloned();
        result
    }

    fn next_live(&mut self) -> Option<FeedEvent> {
        if !self.replaying {
            return None;
        }
        let due = match self.last_replay {
            None => true,
            Some(at) => at.elapsed() >= self.replay_interval,
        };
        if !due {
            return None;
        }

        let value = self.live.pop_front()?;
        self.last_replay = Some(Instant::now());
        Some(match serde_json::from_value::<RawMeasurement>(value) {
            Ok(raw) => FeedEvent::Measurement(raw),
            Err(e) => FeedEvent::Malformed(MalformedEvent::Unparseable(e.to_string())),
        })
    }
}

impl DataSource for FileSource {
    fn request(&mut self, request: ClientRequest) {
        let fixture = match self.read_fixture() {
            Ok(fixture) => fixture,
            Err(e) => {
                self.answers.push_back(request.failure(e));
                return;
            }
        };

        let answer = match &request {
            ClientRequest::GetMetrics => {
                if !self.replaying {
                    self.live = fixture.live.iter().cloned().collect();
                    self.replaying = true;
                }
                FeedEvent::Catalog(Ok(fixture.metrics))
            }
            ClientRequest::GetMultipleMeasurements { input } => {
                FeedEvent::History(Ok(fixture.answer_history(input)))
            }
        };
        debug!(query = request.name(), path = %self.path.display(), "fixture answered query");
        self.answers.push_back(answer);
    }

    fn poll(&mut self) -> Option<FeedEvent> {
        self.answers.pop_front().or_else(|| self.next_live())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::measurement::HistoryQuery;
    use crate::error::LoadError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "metrics": ["cpu", "mem"],
            "history": [
                {"metric": "cpu", "measurements": [
                    {"metric": "cpu", "at": 500, "value": 5, "unit": "%"},
                    {"metric": "cpu", "at": 1000, "value": 10, "unit": "%"}
                ]},
                {"metric": "mem", "measurements": []}
            ],
            "live": [
                {"metric": "cpu", "at": 2000, "value": 20, "unit": "%"},
                {"metric": "disk", "at": "later"}
            ]
        }"#
    }

    fn fixture_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_catalog_query() {
        let file = fixture_file();
        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_none());

        source.request(ClientRequest::GetMetrics);
        assert_eq!(
            source.poll(),
            Some(FeedEvent::Catalog(Ok(vec!["cpu".to_string(), "mem".to_string()])))
        );
    }

    #[test]
    fn test_history_query_applies_lower_bound() {
        let file = fixture_file();
        let mut source = FileSource::new(file.path());
        source.request(ClientRequest::GetMultipleMeasurements {
            input: vec![
                HistoryQuery { metric_name: "cpu".into(), after: 1000 },
                HistoryQuery { metric_name: "mem".into(), after: 1000 },
            ],
        });

        let Some(FeedEvent::History(Ok(histories))) = source.poll() else {
            panic!("expected history");
        };
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].measurements.len(), 1);
        assert_eq!(histories[0].measurements[0].at, 1000);
    }

    #[test]
    fn test_live_replay_starts_after_catalog() {
        let file = fixture_file();
        let mut source = FileSource::new(file.path()).with_replay_interval(Duration::ZERO);
        assert!(source.poll().is_none());

        source.request(ClientRequest::GetMetrics);
        assert!(matches!(source.poll(), Some(FeedEvent::Catalog(_))));
        assert!(matches!(source.poll(), Some(FeedEvent::Measurement(_))));
        assert!(matches!(source.poll(), Some(FeedEvent::Malformed(_))));
        assert!(source.poll().is_none());
        assert_eq!(source.remaining_live(), 0);
    }

    #[test]
    fn test_replay_interval_paces_events() {
        let file = fixture_file();
        let mut source = FileSource::new(file.path()).with_replay_interval(Duration::from_secs(60));
        source.request(ClientRequest::GetMetrics);
        source.poll();

        assert!(matches!(source.poll(), Some(FeedEvent::Measurement(_))));
        assert!(source.poll().is_none());
        assert_eq!(source.remaining_live(), 1);
    }

    #[test]
    fn test_missing_file_fails_query() {
        let mut source = FileSource::new("/nonexistent/fixture.json");
        source.request(ClientRequest::GetMetrics);

        let Some(FeedEvent::Catalog(Err(LoadError::Catalog(msg)))) = source.poll() else {
            panic!("expected catalog failure");
        };
        assert!(msg.starts_with("Read error"));
        assert!(source.error().is_some());
    }

    #[test]
    fn test_parse_error_fails_history_query() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        file.flush().unwrap();

        let mut source = FileSource::new(file.path());
        source.request(ClientRequest::GetMultipleMeasurements { input: vec![] });
        assert!(matches!(source.poll(), Some(FeedEvent::History(Err(LoadError::Hydration(_))))));
    }
}
