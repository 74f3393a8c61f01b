//! Region Fetcher Module
//!
//! Turns a viewport into a validated, clipped list of places.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, PlaceError, Result};
use crate::fetch::PlaceSource;
use crate::geo::GeoBounds;
use crate::place::Place;

// == Region Fetch ==
/// Successful fetch for one region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionFetch {
    /// Valid places located inside the requested bounds
    pub places: Vec<Place>,
    /// Records skipped because they failed validation
    pub dropped: usize,
    /// Valid records discarded because they lie outside the bounds
    pub outside: usize,
}

// == Fetch Outcome ==
/// Result of [`RegionFetcher::fetch_region`], which never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub places: Vec<Place>,
    /// Set when the whole fetch failed and `places` is empty as a result
    pub error: Option<ErrorKind>,
}

// == Region Fetcher ==
/// Fetches places for a viewport with a bounded time budget.
///
/// No retries happen here; the caller decides whether to try again.
#[derive(Clone)]
pub struct RegionFetcher {
    source: Arc<dyn PlaceSource>,
    diagnostics: Arc<dyn Diagnostics>,
    timeout: Duration,
}

impl RegionFetcher {
    // == Constructor ==
    /// # Arguments
    /// * `source` - External document store
    /// * `diagnostics` - Sink for per-record and whole-fetch failures
    /// * `timeout` - Budget for a single request to `source`
    pub fn new(
        source: Arc<dyn PlaceSource>,
        diagnostics: Arc<dyn Diagnostics>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            diagnostics,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Try Fetch Region ==
    /// Fetches and validates places inside `bounds`.
    ///
    /// Fails with [`PlaceError::InvalidBounds`] before contacting the source,
    /// with [`PlaceError::Timeout`] when the budget elapses (the request is
    /// dropped), or with the source's own failure. Malformed records are
    /// reported to diagnostics and skipped.
    pub async fn try_fetch_region(&self, bounds: &GeoBounds) -> Result<RegionFetch> {
        if !bounds.is_valid() {
            return Err(PlaceError::InvalidBounds(format!("{:?}", bounds)));
        }

        let records = tokio::time::timeout(self.timeout, self.source.fetch_all())
            .await
            .map_err(|_| PlaceError::Timeout(self.timeout))??;

        let total = records.len();
        let mut fetch = RegionFetch::default();

        for record in &records {
            match record.to_place() {
                Ok(place) if bounds.contains(&place.location) => fetch.places.push(place),
                Ok(_) => fetch.outside += 1,
                Err(err) => {
                    fetch.dropped += 1;
                    self.diagnostics.log_error(&err, ErrorKind::PlacesProcessing.as_str());
                }
            }
        }

        debug!(
            "Region fetch: {} records, {} in bounds, {} outside, {} malformed",
            total,
            fetch.places.len(),
            fetch.outside,
            fetch.dropped
        );
        self.diagnostics.log_event(
            "region_fetched",
            json!({
                "records": total,
                "places": fetch.places.len(),
                "dropped": fetch.dropped,
            }),
        );

        Ok(fetch)
    }

    // == Fetch Region ==
    /// Infallible form of [`RegionFetcher::try_fetch_region`].
    ///
    /// A whole-fetch failure is logged and degrades to an empty result with
    /// its classification attached.
    pub async fn fetch_region(&self, bounds: &GeoBounds) -> FetchOutcome {
        match self.try_fetch_region(bounds).await {
            Ok(fetch) => FetchOutcome {
                places: fetch.places,
                error: None,
            },
            Err(err) => {
                let kind = err.kind();
                self.diagnostics.log_error(&err, kind.as_str());
                FetchOutcome {
                    places: Vec::new(),
                    error: Some(kind),
                }
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::error::SourceError;
    use crate::fetch::InMemorySource;
    use crate::place::RawRecord;
    use serde_json::json;

    fn record(id: &str, lat: f64, lng: f64) -> RawRecord {
        RawRecord::new(
            id,
            json!({ "name": id, "category": "park", "location": { "latitude": lat, "longitude": lng } }),
        )
    }

    fn fetcher_for(source: Arc<InMemorySource>) -> (RegionFetcher, Arc<RecordingDiagnostics>) {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let fetcher = RegionFetcher::new(source, diagnostics.clone(), Duration::from_secs(15));
        (fetcher, diagnostics)
    }

    fn viewport() -> GeoBounds {
        GeoBounds::new(10.0, 0.0, 10.0, 0.0)
    }

    #[tokio::test]
    async fn test_fetch_filters_to_bounds() {
        let source = Arc::new(InMemorySource::new(vec![
            record("inside", 5.0, 5.0),
            record("edge", 10.0, 0.0),
            record("outside", 20.0, 5.0),
        ]));
        let (fetcher, _) = fetcher_for(source);

        let fetch = fetcher.try_fetch_region(&viewport()).await.unwrap();
        let ids: Vec<&str> = fetch.places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["inside", "edge"]);
        assert_eq!(fetch.outside, 1);
        assert_eq!(fetch.dropped, 0);
    }

    #[tokio::test]
    async fn test_malformed_record_is_skipped() {
        let mut records: Vec<RawRecord> = (0..10)
            .map(|i| record(&format!("p{}", i), 1.0 + i as f64 * 0.5, 5.0))
            .collect();
        records.insert(4, RawRecord::new("broken", json!({ "name": "No point" })));
        let source = Arc::new(InMemorySource::new(records));
        let (fetcher, diagnostics) = fetcher_for(source);

        let outcome = fetcher.fetch_region(&viewport()).await;

        assert_eq!(outcome.places.len(), 10);
        assert!(outcome.error.is_none());
        let errors = diagnostics.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::PlacesProcessing);
        assert!(errors[0].message.contains("broken"));
    }

    #[tokio::test]
    async fn test_invalid_bounds_skip_source() {
        let source = Arc::new(InMemorySource::new(vec![record("a", 5.0, 5.0)]));
        let (fetcher, diagnostics) = fetcher_for(source.clone());
        let inverted = GeoBounds::new(0.0, 10.0, 10.0, 0.0);

        let result = fetcher.try_fetch_region(&inverted).await;
        assert!(matches!(result, Err(PlaceError::InvalidBounds(_))));
        assert_eq!(source.calls(), 0);

        let outcome = fetcher.fetch_region(&inverted).await;
        assert_eq!(outcome.error, Some(ErrorKind::BoundsCalculation));
        assert_eq!(source.calls(), 0);
        assert_eq!(diagnostics.errors()[0].context, "bounds_calculation");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let source = Arc::new(
            InMemorySource::new(vec![record("a", 5.0, 5.0)]).with_latency(Duration::from_secs(20)),
        );
        let (fetcher, _) = fetcher_for(source);

        let result = fetcher.try_fetch_region(&viewport()).await;
        assert_eq!(result, Err(PlaceError::Timeout(Duration::from_secs(15))));

        let outcome = fetcher.fetch_region(&viewport()).await;
        assert!(outcome.places.is_empty());
        assert_eq!(outcome.error, Some(ErrorKind::DataFetch));
    }

    #[tokio::test]
    async fn test_source_failure_degrades_to_empty() {
        let source = Arc::new(InMemorySource::new(vec![record("a", 5.0, 5.0)]));
        source.fail_with(Some(SourceError::Backend("permission denied".into())));
        let (fetcher, diagnostics) = fetcher_for(source);

        let outcome = fetcher.fetch_region(&viewport()).await;
        assert!(outcome.places.is_empty());
        assert_eq!(outcome.error, Some(ErrorKind::FirebaseError));
        assert_eq!(diagnostics.errors()[0].context, "firebase_error");
    }

    #[tokio::test]
    async fn test_fetch_reports_event() {
        let source = Arc::new(InMemorySource::new(vec![record("a", 5.0, 5.0)]));
        let (fetcher, diagnostics) = fetcher_for(source);

        fetcher.fetch_region(&viewport()).await;

        let events = diagnostics.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "region_fetched");
        assert_eq!(events[0].params["places"], 1);
    }
}
