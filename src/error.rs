//! Error types for the reconciliation core.

use thiserror::Error;

/// Failure of one of the one-shot queries (catalog or bulk history).
///
/// Neither variant ever reaches the series store: a failed catalog ends the
/// session in an error display, a failed hydration leaves the dashboard in a
/// recoverable loading state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The metric catalog query failed.
    #[error("catalog unavailable: {0}")]
    Catalog(String),

    /// The bulk historical query failed.
    #[error("history query failed: {0}")]
    Hydration(String),

    /// The transport collaborator went away before answering.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A live event that cannot be turned into a measurement.
///
/// Local to the single event: it is counted and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    /// A required field was absent from the payload.
    #[error("measurement is missing `{0}`")]
    MissingField(&'static str),

    /// The payload was not valid JSON for a measurement event.
    #[error("unparseable event: {0}")]
    Unparseable(String),
}
