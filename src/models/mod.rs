//! Request and Response models for the viewport cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ViewportRequest;
pub use responses::{AcceptedResponse, HealthResponse, MarkersResponse, StatsResponse};
