//! Cache Module
//!
//! Viewport-bounded spatial cache with expiry and size-bounded eviction.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::SpatialCache;

// == Public Constants ==
/// Default maximum number of cached regions
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Default age in seconds after which a cached region is stale
pub const DEFAULT_EXPIRATION_SECS: u64 = 300;
