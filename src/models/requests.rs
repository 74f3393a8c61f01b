//! Request DTOs for the viewport cache API
//!
//! Defines the structure of incoming HTTP request bodies. Filter updates
//! deserialize straight into [`crate::place::PlaceFilter`].

use serde::Deserialize;

use crate::geo::GeoBounds;

/// Request body for POST /viewport
///
/// # Fields
/// - `north`, `south`: latitudes in degrees
/// - `east`, `west`: longitudes in degrees
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewportRequest {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ViewportRequest {
    /// Converts the request into a viewport rectangle.
    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::new(self.north, self.south, self.east, self.west)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.north <= self.south {
            return Some("north must be greater than south".to_string());
        }
        if self.east <= self.west {
            return Some("east must be greater than west".to_string());
        }
        if !self.bounds().is_valid() {
            return Some("coordinates out of range".to_string());
        }
        None
    }
}
