//! Error types for the viewport cache
//!
//! Provides unified error handling using thiserror, plus the coarse
//! classification surfaced to the notification layer.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

// == Place Error Enum ==
/// Unified error type for fetching and reconciling places.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaceError {
    /// Viewport rectangle is malformed; never sent to the data source
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// Region fetch exceeded its time budget
    #[error("Region fetch timed out after {0:?}")]
    Timeout(Duration),

    /// A single document failed validation and was skipped
    #[error("Malformed record {id}: {reason}")]
    RecordMalformed { id: String, reason: String },

    /// Transport failure talking to the data source
    #[error("Network error: {0}")]
    Network(String),

    /// Data source answered with a failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl PlaceError {
    // == Classification ==
    /// Maps the error onto the classification shown to users.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaceError::InvalidBounds(_) => ErrorKind::BoundsCalculation,
            PlaceError::Timeout(_) => ErrorKind::DataFetch,
            PlaceError::RecordMalformed { .. } => ErrorKind::PlacesProcessing,
            PlaceError::Network(_) => ErrorKind::NetworkError,
            PlaceError::Backend(_) => ErrorKind::FirebaseError,
            PlaceError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

// == Error Kind ==
/// Error classification published to the notification layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataFetch,
    BoundsCalculation,
    PlacesProcessing,
    FirebaseError,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    /// Wire name of the classification, also used as diagnostics context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DataFetch => "data_fetch",
            ErrorKind::BoundsCalculation => "bounds_calculation",
            ErrorKind::PlacesProcessing => "places_processing",
            ErrorKind::FirebaseError => "firebase_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Source Error Enum ==
/// Failures reported by a [`crate::fetch::PlaceSource`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("connection failed: {0}")]
    Network(String),

    #[error("store rejected request: {0}")]
    Backend(String),
}

impl From<SourceError> for PlaceError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Network(msg) => PlaceError::Network(msg),
            SourceError::Backend(msg) => PlaceError::Backend(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for PlaceError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlaceError::InvalidBounds(_) => StatusCode::BAD_REQUEST,
            PlaceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PlaceError::RecordMalformed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PlaceError::Network(_) | PlaceError::Backend(_) => StatusCode::BAD_GATEWAY,
            PlaceError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the viewport cache.
pub type Result<T> = std::result::Result<T, PlaceError>;
