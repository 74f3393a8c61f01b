//! Spatial Cache Module
//!
//! Bounded list of region fetch results matched by overlap rather than by
//! exact bounds, with expiry and recency-of-fetch eviction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::geo::{have_significant_overlap, GeoBounds, DEFAULT_OVERLAP_THRESHOLD};
use crate::place::Place;

// == Spatial Cache ==
/// Region cache keyed by overlapping viewport rectangles.
///
/// Entries live in a flat list that every lookup scans linearly, so each
/// lookup and store costs O(entries). With the small bound used for map
/// sessions (tens of entries) this stays cheaper than maintaining an index.
///
/// Every time-dependent operation has an `*_at` form that takes the current
/// instant explicitly.
#[derive(Debug)]
pub struct SpatialCache {
    /// Cached region fetches, oldest store first
    entries: Vec<CacheEntry>,
    /// Lookup and mutation counters
    stats: CacheStats,
    /// Maximum number of entries retained after any store
    max_entries: usize,
    /// Age at which an entry stops answering lookups
    expiration: Duration,
    /// Overlap both rectangles must reach to match
    overlap_threshold: f64,
}

impl SpatialCache {
    // == Constructor ==
    /// Creates an empty cache with the default 0.7 overlap threshold.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of regions kept
    /// * `expiration` - Age after which a region is treated as absent
    pub fn new(max_entries: usize, expiration: Duration) -> Self {
        Self {
            entries: Vec::new(),
            stats: CacheStats::new(),
            max_entries,
            expiration,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }

    /// Overrides the overlap ratio required for a match.
    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    // == Lookup ==
    /// Returns places of the first live entry that significantly overlaps
    /// `bounds`. Has no side effects.
    pub fn lookup(&self, bounds: &GeoBounds) -> Option<Arc<[Place]>> {
        self.lookup_at(bounds, Instant::now())
    }

    /// [`SpatialCache::lookup`] evaluated at `now`.
    ///
    /// Expired entries are skipped here even if no sweep has removed them.
    pub fn lookup_at(&self, bounds: &GeoBounds, now: Instant) -> Option<Arc<[Place]>> {
        self.entries
            .iter()
            .find(|entry| {
                !entry.is_expired_at(now, self.expiration)
                    && have_significant_overlap(&entry.bounds, bounds, self.overlap_threshold)
            })
            .map(|entry| Arc::clone(&entry.places))
    }

    // == Resolve ==
    /// Lookup that also records the hit or miss in the statistics.
    pub fn resolve_at(&mut self, bounds: &GeoBounds, now: Instant) -> Option<Arc<[Place]>> {
        let found = self.lookup_at(bounds, now);
        if found.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        found
    }

    // == Store ==
    /// Stores a fetch result for `bounds`.
    ///
    /// An entry that significantly overlaps `bounds` is replaced outright
    /// (new bounds, payload and timestamp). Otherwise a new entry is
    /// appended and, if the bound is exceeded, the oldest fetches are
    /// discarded.
    pub fn store(&mut self, bounds: GeoBounds, places: impl Into<Arc<[Place]>>) {
        self.store_at(bounds, places, Instant::now());
    }

    /// [`SpatialCache::store`] stamped with `now`.
    pub fn store_at(&mut self, bounds: GeoBounds, places: impl Into<Arc<[Place]>>, now: Instant) {
        let entry = CacheEntry::new(bounds, places.into(), now);

        let overlapping = self
            .entries
            .iter()
            .position(|e| have_significant_overlap(&e.bounds, &bounds, self.overlap_threshold));

        match overlapping {
            Some(index) => {
                // A refreshed region counts as the newest store
                self.entries.remove(index);
                self.entries.push(entry);
                self.stats.record_replacement();
            }
            None => {
                self.entries.push(entry);
                self.stats.record_store();
                self.enforce_capacity();
            }
        }

        self.stats.set_total_entries(self.entries.len());
    }

    /// Keeps only the `max_entries` most recently fetched entries.
    fn enforce_capacity(&mut self) {
        if self.entries.len() <= self.max_entries {
            return;
        }

        // Reverse first so the stable sort ranks later insertions ahead on ties
        self.entries.reverse();
        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let evicted = self.entries.len() - self.max_entries;
        self.entries.truncate(self.max_entries);
        self.entries.reverse();
        self.stats.record_evictions(evicted);
        debug!("Spatial cache evicted {} oldest entries", evicted);
    }

    // == Sweep Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    /// [`SpatialCache::sweep_expired`] evaluated at `now`.
    pub fn sweep_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let expiration = self.expiration;
        self.entries.retain(|entry| !entry.is_expired_at(now, expiration));

        let removed = before - self.entries.len();
        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Accessors ==
    /// Current entries, oldest store first.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }
}
