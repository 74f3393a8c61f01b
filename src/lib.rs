//! Viewport Cache - places for whatever the map is showing
//!
//! Keeps a small spatial cache of recently fetched map regions, fetches
//! missing regions from a place store, and publishes the filtered set of
//! places visible in the current viewport.

pub mod api;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod models;
pub mod place;
pub mod reconciler;
pub mod tasks;

pub use api::AppState;
pub use cache::SpatialCache;
pub use config::Config;
pub use error::{ErrorKind, PlaceError};
pub use geo::GeoBounds;
pub use reconciler::{ReconcilerHandle, ViewportReconciler, ViewportStatus, VisibleSnapshot};
pub use tasks::{spawn_notification_task, spawn_sweep_task};
