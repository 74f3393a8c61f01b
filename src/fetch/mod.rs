//! Fetch Module
//!
//! Retrieves place records for a viewport from an external data source that
//! cannot bound its own queries, validating and clipping them client-side.

mod fetcher;
mod source;

pub use fetcher::{FetchOutcome, RegionFetch, RegionFetcher};
pub use source::{InMemorySource, JsonFileSource, PlaceSource};

// == Public Constants ==
/// Default time budget for one region fetch, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
