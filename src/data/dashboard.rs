//! The dashboard state owner.
//!
//! Holds the catalog, the series store, the selection and the color map, and
//! is the only thing that mutates them. Async completions from the source
//! come in through [`Dashboard::handle`]; user intents through
//! [`Dashboard::select`] and [`Dashboard::deselect`]. Both run on the UI
//! thread, one at a time.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::catalog::CatalogLoader;
use super::colors::{assign_colors, ColorAssignment, Rgb};
use super::hydrate::SnapshotHydrator;
use super::measurement::{Measurement, MetricId};
use super::merge::{LiveMerge, MergeOutcome, MergeStats};
use super::selection::SelectionSet;
use super::store::{Applied, SeriesStore, StoreCommand};
use crate::source::{ClientRequest, FeedEvent};

/// Where the dashboard is in its startup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the catalog.
    LoadingCatalog,
    /// Catalog loaded, waiting for the historical snapshot.
    Hydrating,
    /// Snapshot applied (or the user is working without one).
    Ready,
    /// The catalog could not be loaded. Nothing else runs.
    CatalogUnavailable(String),
    /// The snapshot query failed. Live data still flows for enrolled metrics.
    HydrationFailed(String),
}

impl Phase {
    /// Whether a loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::LoadingCatalog | Phase::Hydrating)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::LoadingCatalog => "Loading metrics",
            Phase::Hydrating => "Loading history",
            Phase::Ready => "Live",
            Phase::CatalogUnavailable(_) => "Catalog unavailable",
            Phase::HydrationFailed(_) => "History unavailable",
        }
    }
}

/// What rendering needs for one displayed metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView<'a> {
    pub metric: &'a str,
    /// Arrival order, as stored.
    pub measurements: &'a [Measurement],
    /// Unit of the first measurement; `None` while the series is empty.
    pub unit: Option<&'a str>,
    pub color: Option<Rgb>,
}

impl SeriesView<'_> {
    /// `(at, value)` pairs sorted by `at`, for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> =
            self.measurements.iter().map(|m| (m.at as f64, m.value)).collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }

    /// Most recently arrived measurement.
    pub fn latest(&self) -> Option<&Measurement> {
        self.measurements.last()
    }
}

/// Owner of all view state.
#[derive(Debug)]
pub struct Dashboard {
    phase: Phase,
    catalog: Vec<MetricId>,
    colors: ColorAssignment,
    loader: CatalogLoader,
    hydrator: SnapshotHydrator,
    merge: LiveMerge,
    store: SeriesStore,
    selection: SelectionSet,
}

impl Dashboard {
    /// Create a dashboard whose history window starts `lookback` before now.
    pub fn new(lookback: Duration) -> Self {
        Self::with_hydrator(SnapshotHydrator::new(lookback))
    }

    pub fn with_hydrator(hydrator: SnapshotHydrator) -> Self {
        Self {
            phase: Phase::LoadingCatalog,
            catalog: Vec::new(),
            colors: ColorAssignment::new(),
            loader: CatalogLoader::new(),
            hydrator,
            merge: LiveMerge::new(),
            store: SeriesStore::new(),
            selection: SelectionSet::new(),
        }
    }

    /// The catalog query to send at startup; `None` after the first call.
    pub fn start(&mut self) -> Option<ClientRequest> {
        self.loader.request().then_some(ClientRequest::GetMetrics)
    }

    /// Apply one delivered event. Returns a follow-up query to send, if any.
    pub fn handle(&mut self, event: FeedEvent) -> Option<ClientRequest> {
        if let Phase::CatalogUnavailable(_) = self.phase {
            return None;
        }

        match event {
            FeedEvent::Catalog(result) => self.on_catalog(result),
            FeedEvent::History(result) => {
                self.on_history(result);
                None
            }
            FeedEvent::Measurement(raw) => {
                if let MergeOutcome::Accept(command) = self.merge.on_measurement(raw, &self.store) {
                    self.store.apply(command);
                }
                None
            }
            FeedEvent::Malformed(error) => {
                self.merge.on_malformed(error);
                None
            }
        }
    }

    fn on_catalog(&mut self, result: Result<Vec<MetricId>, crate::error::LoadError>) -> Option<ClientRequest> {
        match self.loader.complete(result) {
            Ok(catalog) => {
                let first = self.catalog.is_empty() && self.phase == Phase::LoadingCatalog;
                self.colors = assign_colors(&catalog);
                self.catalog = catalog;
                if !first {
                    debug!("catalog refreshed; colors reassigned");
                    return None;
                }
                self.phase = Phase::Hydrating;
                info!(after = self.hydrator.after(), "requesting history");
                Some(ClientRequest::GetMultipleMeasurements {
                    input: self.hydrator.request(&self.catalog),
                })
            }
            Err(e) => {
                if self.phase == Phase::LoadingCatalog {
                    self.phase = Phase::CatalogUnavailable(e.to_string());
                } else {
                    warn!(error = %e, "late catalog failure ignored");
                }
                None
            }
        }
    }

    fn on_history(&mut self, result: Result<Vec<super::MetricHistory>, crate::error::LoadError>) {
        if self.store.is_hydrated() {
            debug!("history arrived after hydration; discarded");
            return;
        }

        match self.hydrator.complete(result, &self.catalog) {
            Ok(command) => {
                if let Applied::Seeded { metrics } = self.store.apply(command) {
                    info!(metrics, "series store hydrated");
                }
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.phase = Phase::HydrationFailed(e.to_string());
            }
        }
    }

    /// Re-send the history query after a failure. Never called automatically.
    pub fn retry_hydration(&mut self) -> Option<ClientRequest> {
        if !matches!(self.phase, Phase::HydrationFailed(_)) || self.store.is_hydrated() {
            return None;
        }
        self.phase = Phase::Hydrating;
        info!(attempt = self.hydrator.requests() + 1, "retrying history");
        Some(ClientRequest::GetMultipleMeasurements {
            input: self.hydrator.request(&self.catalog),
        })
    }

    /// Select a catalog metric for display, enrolling it if needed.
    ///
    /// A metric with no series yet starts empty: there is no backfill.
    /// Returns false if the metric is unknown or already selected.
    pub fn select(&mut self, metric: &str) -> bool {
        if !self.catalog.iter().any(|m| m == metric) {
            debug!(metric, "cannot select metric outside the catalog");
            return false;
        }
        if self.store.apply(StoreCommand::Enroll(metric.to_string())) == Applied::Enrolled {
            debug!(metric, "metric enrolled without history");
        }
        self.selection.select(metric)
    }

    /// Hide a metric. Its series is kept and keeps growing.
    pub fn deselect(&mut self, metric: &str) -> bool {
        self.selection.deselect(metric)
    }

    /// Flip the selection state of a metric. Returns whether it is now selected.
    pub fn toggle(&mut self, metric: &str) -> bool {
        if self.selection.contains(metric) {
            self.deselect(metric);
            false
        } else {
            self.select(metric)
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn catalog(&self) -> &[MetricId] {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    pub fn color_of(&self, metric: &str) -> Option<Rgb> {
        self.colors.get(metric).copied()
    }

    pub fn stats(&self) -> MergeStats {
        self.merge.stats()
    }

    /// Selected metrics in selection order, with their series.
    pub fn visible_series(&self) -> Vec<SeriesView<'_>> {
        self.selection
            .as_slice()
            .iter()
            .filter_map(|metric| {
                let series = self.store.get(metric)?;
                Some(SeriesView {
                    metric,
                    measurements: series.as_slice(),
                    unit: series.first().map(|m| m.unit.as_str()),
                    color: self.color_of(metric),
                })
            })
            .collect()
    }

    /// Current state as pretty JSON.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let series: serde_json::Map<String, serde_json::Value> = self
            .store
            .iter()
            .map(|(metric, s)| (metric.clone(), serde_json::json!(s.as_slice())))
            .collect();

        let export = serde_json::json!({
            "phase": self.phase.label(),
            "catalog": self.catalog,
            "selected": self.selection.as_slice(),
            "colors": self
                .colors
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.to_string())))
                .collect::<serde_json::Map<_, _>>(),
            "series": series,
            "stats": {
                "accepted": self.stats().accepted,
                "unenrolled": self.stats().unenrolled,
                "malformed": self.stats().malformed,
            },
        });
        serde_json::to_string_pretty(&export)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::with_hydrator(SnapshotHydrator::default())
    }
}
