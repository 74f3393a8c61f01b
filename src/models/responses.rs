//! Response DTOs for the viewport cache API
//!
//! Defines the structure of outgoing HTTP response bodies. The visible
//! places themselves are served as [`crate::reconciler::VisibleSnapshot`].

use serde::Serialize;

use crate::cache::CacheStats;
use crate::reconciler::{Marker, ViewportStatus, VisibleSnapshot};

/// Response body for requests that only enqueue work
/// (POST /viewport, PUT /filters, POST /retry)
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedResponse {
    /// Human readable confirmation
    pub message: String,
}

impl AcceptedResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /markers
#[derive(Debug, Clone, Serialize)]
pub struct MarkersResponse {
    pub markers: Vec<Marker>,
    pub status: ViewportStatus,
    pub generation: u64,
}

impl From<&VisibleSnapshot> for MarkersResponse {
    fn from(snapshot: &VisibleSnapshot) -> Self {
        Self {
            markers: snapshot.markers(),
            status: snapshot.status,
            generation: snapshot.generation,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups served from a cached region
    pub hits: u64,
    /// Lookups that went to the data source
    pub misses: u64,
    pub stores: u64,
    pub replacements: u64,
    pub evictions: u64,
    pub expired: u64,
    /// Current number of cached regions
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            replacements: stats.replacements,
            evictions: stats.evictions,
            expired: stats.expired,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::place::Place;

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 8,
            misses: 2,
            total_entries: 3,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 3);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::new());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_markers_response() {
        let mut snapshot = VisibleSnapshot::initial();
        snapshot.places = vec![Place::new("p1", "Park", LatLng::new(1.0, 1.0))];
        snapshot.status = ViewportStatus::Some;

        let resp = MarkersResponse::from(&snapshot);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "some");
        assert_eq!(json["markers"][0]["id"], "p1");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
