//! Geo Module
//!
//! Axis-aligned latitude/longitude rectangles and the pure overlap
//! computations used for cache matching and viewport change detection.

mod bounds;
mod overlap;

pub use bounds::{GeoBounds, LatLng};
pub use overlap::{
    center_distance, have_significant_overlap, is_change_significant, overlap_ratio,
};

// == Public Constants ==
/// Default overlap ratio both rectangles must reach for a cache hit
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.7;

/// Default ratio below which a viewport change is worth reacting to
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.3;

/// Mean earth radius in meters, used for haversine distances
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
