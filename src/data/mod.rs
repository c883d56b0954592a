//! The reconciliation core: catalog, snapshot, live merge, selection.
//!
//! Everything here is synchronous and owned by a single [`Dashboard`]; the
//! asynchronous parts live behind [`crate::source::DataSource`].
//!
//! ## Submodules
//!
//! - [`measurement`]: wire-level types ([`Measurement`], [`RawMeasurement`], [`MetricHistory`])
//! - [`catalog`]: the one-shot metric catalog load
//! - [`hydrate`]: the one-shot historical snapshot with a fixed lookback anchor
//! - [`merge`]: the live merge engine and its acceptance filter
//! - [`store`]: the append-only [`SeriesStore`]
//! - [`selection`]: the ordered [`SelectionSet`]
//! - [`colors`]: random per-metric display colors
//! - [`dashboard`]: the state owner tying these together
//! - [`duration`]: parsing and formatting of human durations ("30m", "250ms")
//!
//! ## Data Flow
//!
//! ```text
//! GetMetrics ──▶ CatalogLoader ──▶ SnapshotHydrator ──▶ StoreCommand::Seed ─┐
//!                                                                          ▼
//! newMeasurement ──▶ LiveMerge ──(enrolled?)──▶ StoreCommand::Append ──▶ SeriesStore
//!                                                                          ▲
//! select(metric) ──▶ SelectionSet + StoreCommand::Enroll ──────────────────┘
//! ```

pub mod catalog;
pub mod colors;
pub mod dashboard;
pub mod duration;
pub mod hydrate;
pub mod measurement;
pub mod merge;
pub mod selection;
pub mod store;

pub use colors::{assign_colors, ColorAssignment, Rgb};
pub use dashboard::{Dashboard, Phase, SeriesView};
pub use hydrate::{SnapshotHydrator, DEFAULT_LOOKBACK};
pub use measurement::{HistoryQuery, Measurement, MetricHistory, MetricId, RawMeasurement, Timestamp};
pub use merge::{LiveMerge, MergeOutcome, MergeStats};
pub use selection::SelectionSet;
pub use store::{Applied, SeriesStore, StoreCommand, TimeSeries};
