//! API Handlers
//!
//! HTTP request handlers for each viewport cache endpoint. Handlers only
//! enqueue work on the reconciler or read its published snapshot; none of
//! them touch the cache directly.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, info};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{PlaceError, Result};
use crate::fetch::{InMemorySource, JsonFileSource, PlaceSource, RegionFetcher};
use crate::models::{
    AcceptedResponse, HealthResponse, MarkersResponse, StatsResponse, ViewportRequest,
};
use crate::place::PlaceFilter;
use crate::reconciler::{ReconcilerHandle, ViewportReconciler, VisibleSnapshot};

/// Application state shared across all handlers.
///
/// Holds the handle of the running reconciler task, which owns the cache.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: ReconcilerHandle,
}

impl AppState {
    /// Creates a new AppState around a running reconciler.
    pub fn new(reconciler: ReconcilerHandle) -> Self {
        Self { reconciler }
    }

    /// Spawns the reconciler described by `config` and wraps its handle.
    ///
    /// Places come from `PLACES_FILE` when set, otherwise from an empty
    /// in-memory store.
    pub fn from_config(config: &Config, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let source: Arc<dyn PlaceSource> = match &config.places_file {
            Some(path) => {
                info!("Serving places from {}", path.display());
                Arc::new(JsonFileSource::new(path.clone()))
            }
            None => {
                info!("PLACES_FILE not set, serving an empty place store");
                Arc::new(InMemorySource::new(Vec::new()))
            }
        };

        let fetcher = RegionFetcher::new(source, diagnostics.clone(), config.fetch_timeout());
        let (reconciler, _task) = ViewportReconciler::spawn(
            config.reconciler_settings(),
            config.spatial_cache(),
            fetcher,
            diagnostics,
        );
        Self::new(reconciler)
    }
}

/// Handler for POST /viewport
///
/// Reports a new map viewport. Evaluation happens after the debounce period.
pub async fn viewport_handler(
    State(state): State<AppState>,
    Json(req): Json<ViewportRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>)> {
    match state.reconciler.viewport_changed(req.bounds()) {
        Ok(()) => {
            debug!("Viewport accepted: {:?}", req.bounds());
            Ok((
                StatusCode::ACCEPTED,
                Json(AcceptedResponse::new("viewport accepted")),
            ))
        }
        Err(PlaceError::InvalidBounds(_)) => Err(PlaceError::InvalidBounds(
            req.validate().unwrap_or_else(|| "invalid bounds".to_string()),
        )),
        Err(err) => Err(err),
    }
}

/// Handler for PUT /filters
///
/// Replaces the attribute filter. Takes effect without a new fetch.
pub async fn filters_handler(
    State(state): State<AppState>,
    Json(filter): Json<PlaceFilter>,
) -> Result<Json<AcceptedResponse>> {
    state.reconciler.set_filter(filter)?;
    Ok(Json(AcceptedResponse::new("filters updated")))
}

/// Handler for POST /retry
pub async fn retry_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AcceptedResponse>)> {
    state.reconciler.retry()?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new("retry scheduled")),
    ))
}

/// Handler for GET /places
pub async fn places_handler(State(state): State<AppState>) -> Json<VisibleSnapshot> {
    Json(state.reconciler.snapshot())
}

/// Handler for GET /markers
pub async fn markers_handler(State(state): State<AppState>) -> Json<MarkersResponse> {
    Json(MarkersResponse::from(&state.reconciler.snapshot()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.reconciler.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::reconciler::ViewportStatus;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default(), Arc::new(RecordingDiagnostics::new()))
    }

    fn viewport(north: f64, south: f64, east: f64, west: f64) -> ViewportRequest {
        ViewportRequest {
            north,
            south,
            east,
            west,
        }
    }

    #[tokio::test]
    async fn test_viewport_handler_accepts_valid_bounds() {
        let state = test_state();

        let result = viewport_handler(State(state), Json(viewport(10.0, 0.0, 10.0, 0.0))).await;
        let (status, _) = result.unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_viewport_handler_rejects_inverted_bounds() {
        let state = test_state();

        let result = viewport_handler(State(state), Json(viewport(0.0, 10.0, 10.0, 0.0))).await;
        match result {
            Err(PlaceError::InvalidBounds(reason)) => assert!(reason.contains("north")),
            other => panic!("expected invalid bounds, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_places_handler_before_any_viewport() {
        let state = test_state();

        let response = places_handler(State(state)).await;
        assert_eq!(response.status, ViewportStatus::NeedsSearch);
        assert!(response.places.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await.unwrap();
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_filters_and_retry_handlers() {
        let state = test_state();

        assert!(filters_handler(State(state.clone()), Json(PlaceFilter::default()))
            .await
            .is_ok());
        assert!(retry_handler(State(state)).await.is_ok());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
