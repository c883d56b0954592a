//! Per-metric display colors.
//!
//! Purely cosmetic: colors are regenerated whenever the catalog changes and
//! are not stable between regenerations.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use super::measurement::MetricId;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub type ColorAssignment = HashMap<MetricId, Rgb>;

/// Assign a random color to every metric using the thread-local RNG.
pub fn assign_colors(metrics: &[MetricId]) -> ColorAssignment {
    assign_colors_with(metrics, &mut rand::thread_rng())
}

/// Assign a random color to every metric using `rng`.
pub fn assign_colors_with<R: Rng + ?Sized>(metrics: &[MetricId], rng: &mut R) -> ColorAssignment {
    metrics
        .iter()
        .map(|metric| (metric.clone(), Rgb(rng.gen(), rng.gen(), rng.gen())))
        .collect()
}
