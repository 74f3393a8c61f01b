//! Place Module
//!
//! Domain entities returned by region fetches, the raw document shape they
//! are mapped from, and the attribute filter applied before publishing.

mod filter;
mod record;

pub use filter::PlaceFilter;
pub use record::RawRecord;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

// == Place ==
/// A family-friendly location shown on the map.
///
/// Treated as an opaque payload by the cache; never mutated after mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: String,
    pub age_groups: Vec<String>,
    pub price: String,
    pub amenities: Vec<String>,
    pub location: LatLng,
    pub verification_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Place {
    /// Creates a place with the given identity and location and empty attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: LatLng) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            age_groups: Vec::new(),
            price: String::new(),
            amenities: Vec::new(),
            location,
            verification_count: 0,
            description: None,
            address: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_age_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.age_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }
}
