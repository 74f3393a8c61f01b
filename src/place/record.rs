//! Raw Record Module
//!
//! Documents handed back by the data source and their validation into
//! [`Place`] values. Each record is validated on its own so one corrupt
//! document cannot blank out a whole viewport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlaceError, Result};
use crate::geo::LatLng;
use crate::place::Place;

// == Raw Record ==
/// A document as stored by the external data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Document identifier
    pub id: String,
    /// Untyped document body
    pub data: Value,
}

/// Typed view of a place document. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default, alias = "ageRange")]
    age_groups: Vec<String>,
    #[serde(default, alias = "priceRange")]
    price: String,
    #[serde(default)]
    amenities: Vec<String>,
    #[serde(default)]
    location: Option<PointDocument>,
    #[serde(default)]
    verification_count: u32,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointDocument {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    longitude: f64,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    // == Into Place ==
    /// Validates the document and maps it into a [`Place`].
    ///
    /// Fails with [`PlaceError::RecordMalformed`] when the id is empty, a
    /// field has the wrong type, or the location is missing or out of range.
    pub fn to_place(&self) -> Result<Place> {
        if self.id.trim().is_empty() {
            return Err(self.malformed("missing document id"));
        }

        let doc: PlaceDocument = serde_json::from_value(self.data.clone())
            .map_err(|e| self.malformed(e.to_string()))?;

        let point = doc
            .location
            .ok_or_else(|| self.malformed("missing location"))?;
        let location = LatLng::new(point.latitude, point.longitude);
        if !location.is_valid() {
            return Err(self.malformed(format!(
                "location out of range: ({}, {})",
                location.lat, location.lng
            )));
        }

        Ok(Place {
            id: self.id.clone(),
            name: doc.name,
            category: doc.category,
            age_groups: doc.age_groups,
            price: doc.price,
            amenities: doc.amenities,
            location,
            verification_count: doc.verification_count,
            description: doc.description,
            address: doc.address,
        })
    }

    fn malformed(&self, reason: impl Into<String>) -> PlaceError {
        PlaceError::RecordMalformed {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }
}
