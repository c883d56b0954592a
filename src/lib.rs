//! # metricwatch
//!
//! A live metrics dashboard for the terminal, and the reconciliation core
//! behind it.
//!
//! The dashboard loads a catalog of metric names once, backfills a fixed
//! window of history for every metric once, and then merges an unbounded
//! live feed of measurements into per-metric series. Only metrics already in
//! the series store receive live data; selecting a metric enrolls it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │(Dashboard)    │(rendering)   │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │ queries ▲ events                                    │
//! │       ▼         │                                           │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── StreamSource | FileSource | ChannelSource   │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: TUI state, cursor and overlays; pumps source events into the dashboard
//! - **[`source`]**: the transport boundary ([`DataSource`] trait) with a TCP/NDJSON
//!   stream, a fixture file, and in-process channels
//! - **[`data`]**: the core: catalog loader, snapshot hydrator, live merge engine,
//!   series store, selection and colors, owned by [`Dashboard`]
//! - **[`ui`]**: ratatui rendering: metric list, value cards, chart, theme
//!
//! ## Usage
//!
//! ### Driving the core directly
//!
//! ```
//! use metricwatch::{Dashboard, FeedEvent, Measurement, MetricHistory};
//!
//! let mut dashboard = Dashboard::default();
//! let _catalog_query = dashboard.start();
//! let _history_query = dashboard.handle(FeedEvent::Catalog(Ok(vec!["cpu".into()])));
//! dashboard.handle(FeedEvent::History(Ok(vec![MetricHistory {
//!     metric: "cpu".into(),
//!     measurements: vec![],
//! }])));
//!
//! dashboard.select("cpu");
//! dashboard.handle(FeedEvent::Measurement(Measurement::new("cpu", 2000, 20.0, "%").into()));
//! assert_eq!(dashboard.visible_series()[0].measurements.len(), 1);
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use metricwatch::{App, ChannelSource, Dashboard, Theme};
//!
//! let (handle, source) = ChannelSource::create("in-process");
//! let mut app = App::new(Box::new(source), Dashboard::default(), Theme::dark());
//! app.start();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Settings, ThemeChoice};
pub use data::{
    Dashboard, Measurement, MetricHistory, MetricId, Phase, RawMeasurement, SeriesStore,
    SeriesView, SnapshotHydrator,
};
pub use error::{LoadError, MalformedEvent};
pub use source::{
    ChannelSource, ClientRequest, DataSource, FeedEvent, FeedHandle, FileSource, StreamSource,
};
pub use ui::Theme;
