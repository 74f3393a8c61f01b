//! Bounds Module
//!
//! Defines the geographic point and viewport rectangle value types.

use serde::{Deserialize, Serialize};

use crate::geo::EARTH_RADIUS_METERS;

// == LatLng ==
/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checks that both coordinates are finite and inside the lat/lng domain.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to another point in meters (haversine).
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        // Rounding can push `a` past 1.0 for near-antipodal points
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

// == Geo Bounds ==
/// Axis-aligned viewport rectangle in degrees.
///
/// Constructed fresh on every viewport read and never mutated. Use
/// [`GeoBounds::is_valid`] before trusting values that came from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    // == Constructor ==
    /// Creates bounds from the four edges. No validation is performed.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    // == Validity ==
    /// Checks that all edges are finite, ordered, and inside the lat/lng domain.
    pub fn is_valid(&self) -> bool {
        let finite = self.north.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.west.is_finite();
        if !finite {
            return false;
        }

        let lat_ok = (-90.0..=90.0).contains(&self.north) && (-90.0..=90.0).contains(&self.south);
        let lng_ok = (-180.0..=180.0).contains(&self.east) && (-180.0..=180.0).contains(&self.west);

        lat_ok && lng_ok && self.north >= self.south && self.east >= self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    // == Area ==
    /// Area in square degrees. Degenerate or inverted rectangles have zero area.
    pub fn area(&self) -> f64 {
        let width = self.width();
        let height = self.height();
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            0.0
        } else {
            width * height
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    // == Contains ==
    /// Checks whether a point lies inside the rectangle, edges included.
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }

    // == Intersection ==
    /// Returns the intersection rectangle, or None when it is empty.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersection(&self, other: &GeoBounds) -> Option<GeoBounds> {
        let north = self.north.min(other.north);
        let south = self.south.max(other.south);
        let east = self.east.min(other.east);
        let west = self.west.max(other.west);

        if north <= south || east <= west {
            None
        } else {
            Some(GeoBounds::new(north, south, east, west))
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        assert!(GeoBounds::new(10.0, 0.0, 10.0, 0.0).is_valid());
        assert!(GeoBounds::new(90.0, -90.0, 180.0, -180.0).is_valid());
        // A single point is still a valid (degenerate) rectangle
        assert!(GeoBounds::new(5.0, 5.0, 5.0, 5.0).is_valid());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(!GeoBounds::new(0.0, 10.0, 10.0, 0.0).is_valid());
        assert!(!GeoBounds::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!GeoBounds::new(91.0, 0.0, 10.0, 0.0).is_valid());
        assert!(!GeoBounds::new(10.0, 0.0, 181.0, 0.0).is_valid());
        assert!(!GeoBounds::new(f64::NAN, 0.0, 10.0, 0.0).is_valid());
        assert!(!GeoBounds::new(10.0, f64::NEG_INFINITY, 10.0, 0.0).is_valid());
    }

    #[test]
    fn test_area_and_center() {
        let bounds = GeoBounds::new(10.0, 0.0, 20.0, 0.0);
        assert_eq!(bounds.area(), 200.0);
        assert_eq!(bounds.center(), LatLng::new(5.0, 10.0));
        assert_eq!(GeoBounds::new(5.0, 5.0, 10.0, 0.0).area(), 0.0);
    }

    #[test]
    fn test_contains_edges() {
        let bounds = GeoBounds::new(10.0, 0.0, 10.0, 0.0);
        assert!(bounds.contains(&LatLng::new(0.0, 0.0)));
        assert!(bounds.contains(&LatLng::new(10.0, 10.0)));
        assert!(bounds.contains(&LatLng::new(5.0, 5.0)));
        assert!(!bounds.contains(&LatLng::new(10.1, 5.0)));
        assert!(!bounds.contains(&LatLng::new(5.0, -0.1)));
    }

    #[test]
    fn test_intersection() {
        let a = GeoBounds::new(10.0, 0.0, 10.0, 0.0);
        let b = GeoBounds::new(15.0, 5.0, 15.0, 5.0);
        assert_eq!(a.intersection(&b), Some(GeoBounds::new(10.0, 5.0, 10.0, 5.0)));

        // Touching edges only
        let c = GeoBounds::new(20.0, 10.0, 10.0, 0.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_point_validity_and_distance() {
        assert!(LatLng::new(45.0, 90.0).is_valid());
        assert!(!LatLng::new(95.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::NAN).is_valid());

        // One degree of latitude is roughly 111 km
        let d = LatLng::new(0.0, 0.0).distance_to(&LatLng::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 100.0, "distance was {}", d);
    }
}
