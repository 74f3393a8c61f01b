//! Cache Entry Module
//!
//! Defines a cached region fetch: the bounds it covered, the places it
//! returned, and when it was stored.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::geo::GeoBounds;
use crate::place::Place;

// == Cache Entry ==
/// Result of one successful region fetch. Immutable once created.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Region the places were fetched for
    pub bounds: GeoBounds,
    /// Places inside `bounds`, shared with readers
    pub places: Arc<[Place]>,
    /// When the fetch result was stored
    pub timestamp: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with `timestamp`.
    pub fn new(bounds: GeoBounds, places: Arc<[Place]>, timestamp: Instant) -> Self {
        Self {
            bounds,
            places,
            timestamp,
        }
    }

    /// Age of the entry at `now`. Saturates to zero if `now` is earlier.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: once the age reaches `expiration` exactly, the
    /// entry is expired.
    pub fn is_expired_at(&self, now: Instant, expiration: Duration) -> bool {
        self.age_at(now) >= expiration
    }
}
