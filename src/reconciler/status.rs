//! Published viewport state: the visible places and their status.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorKind;
use crate::geo::{GeoBounds, LatLng};
use crate::place::Place;

// == Viewport Status ==
/// Coarse state of the visible result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportStatus {
    /// A fetch for the current viewport is outstanding
    Loading,
    /// Viewport changes are still being debounced
    Panning,
    /// No places match the current viewport and filters
    Empty,
    /// More places than the "many" threshold
    Many,
    /// Some places, up to the "many" threshold
    Some,
    /// No viewport has been evaluated yet
    NeedsSearch,
}

impl ViewportStatus {
    /// Classifies a settled result set of `count` places.
    pub fn classify(count: usize, many_threshold: usize) -> Self {
        if count == 0 {
            ViewportStatus::Empty
        } else if count > many_threshold {
            ViewportStatus::Many
        } else {
            ViewportStatus::Some
        }
    }
}

// == Marker ==
/// What the map needs to draw one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub location: LatLng,
    pub category: String,
}

// == Visible Snapshot ==
/// Everything the rest of the application reads about the current viewport.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleSnapshot {
    /// Places in view that pass the active filter
    pub places: Vec<Place>,
    pub status: ViewportStatus,
    /// Classification of the last failure, cleared by the next good result
    pub error: Option<ErrorKind>,
    /// Viewport the places were resolved for
    pub bounds: Option<GeoBounds>,
    /// Evaluation generation that produced this snapshot
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl VisibleSnapshot {
    /// State before any viewport has been seen.
    pub fn initial() -> Self {
        Self {
            places: Vec::new(),
            status: ViewportStatus::NeedsSearch,
            error: None,
            bounds: None,
            generation: 0,
            updated_at: Utc::now(),
        }
    }

    /// Render instructions for the map widget.
    pub fn markers(&self) -> Vec<Marker> {
        self.places
            .iter()
            .map(|place| Marker {
                id: place.id.clone(),
                location: place.location,
                category: place.category.clone(),
            })
            .collect()
    }
}
