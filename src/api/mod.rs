//! API Module
//!
//! HTTP handlers and routing for the viewport cache REST API.
//!
//! # Endpoints
//! - `POST /viewport` - Report a new map viewport
//! - `PUT /filters` - Replace the attribute filter
//! - `POST /retry` - Re-evaluate the current viewport
//! - `GET /places` - Visible places with status and error
//! - `GET /markers` - Map markers for the visible places
//! - `GET /stats` - Spatial cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
