//! Reconciler Module
//!
//! Turns a stream of map viewport changes into a published set of visible
//! places: debounce, decide whether the change matters, resolve from cache
//! or fetch, filter, publish.

mod handle;
mod status;
mod viewport;

pub use handle::ReconcilerHandle;
pub use status::{Marker, ViewportStatus, VisibleSnapshot};
pub use viewport::ViewportReconciler;

use std::time::Duration;

use crate::geo::DEFAULT_CHANGE_THRESHOLD;

// == Public Constants ==
/// Quiet period before a burst of viewport changes is evaluated, in ms
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Result count above which the status becomes `many`
pub const DEFAULT_MANY_THRESHOLD: usize = 20;

// == Reconciler Settings ==
/// Tunables for viewport evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerSettings {
    /// Quiet period before evaluating a viewport change
    pub debounce: Duration,
    /// Overlap ratio below which a viewport change is acted upon
    pub change_threshold: f64,
    /// Result count above which the status becomes `many`
    pub many_threshold: usize,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            many_threshold: DEFAULT_MANY_THRESHOLD,
        }
    }
}
