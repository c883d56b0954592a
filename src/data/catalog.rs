//! Metric catalog loading.

use tracing::{info, warn};

use super::measurement::MetricId;
use crate::error::LoadError;

/// Loads the set of known metric identifiers once.
///
/// The request goes out through [`CatalogLoader::request`]; the answer is
/// handed to [`CatalogLoader::complete`] when the transport delivers it.
/// Retrying is left to the transport.
#[derive(Debug, Default)]
pub struct CatalogLoader {
    requested: bool,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the catalog as requested. Returns false on every call after the first.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Turn the transport's answer into the catalog.
    ///
    /// Duplicate names are collapsed, keeping the first occurrence.
    pub fn complete(&self, result: Result<Vec<MetricId>, LoadError>) -> Result<Vec<MetricId>, LoadError> {
        match result {
            Ok(names) => {
                let mut catalog: Vec<MetricId> = Vec::with_capacity(names.len());
                for name in names {
                    if !catalog.contains(&name) {
                        catalog.push(name);
                    }
                }
                info!(metrics = catalog.len(), "catalog loaded");
                Ok(catalog)
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                Err(match e {
                    LoadError::Catalog(msg) | LoadError::Transport(msg) | LoadError::Hydration(msg) => {
                        LoadError::Catalog(msg)
                    }
                })
            }
        }
    }
}
