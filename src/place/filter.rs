//! Attribute filter applied to candidate places before publishing.

use serde::{Deserialize, Serialize};

use crate::place::Place;

// == Place Filter ==
/// Active attribute filter. Every dimension is ANDed with the others and an
/// empty list places no constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceFilter {
    /// Place category must be one of these
    #[serde(default)]
    pub categories: Vec<String>,
    /// Place must share at least one age group with these
    #[serde(default)]
    pub age_groups: Vec<String>,
    /// Place price tier must be one of these
    #[serde(default)]
    pub price_tiers: Vec<String>,
    /// Place must offer every one of these amenities
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl PlaceFilter {
    /// Returns true when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.age_groups.is_empty()
            && self.price_tiers.is_empty()
            && self.amenities.is_empty()
    }

    // == Matches ==
    /// Checks a place against every constrained dimension.
    pub fn matches(&self, place: &Place) -> bool {
        let category_ok = self.categories.is_empty() || self.categories.contains(&place.category);

        let age_ok = self.age_groups.is_empty()
            || place
                .age_groups
                .iter()
                .any(|group| self.age_groups.contains(group));

        let price_ok = self.price_tiers.is_empty() || self.price_tiers.contains(&place.price);

        let amenities_ok = self
            .amenities
            .iter()
            .all(|amenity| place.amenities.contains(amenity));

        category_ok && age_ok && price_ok && amenities_ok
    }
}
