//! Background Tasks Module
//!
//! Contains background tasks that run alongside the server.
//!
//! # Tasks
//! - Cache Sweep: Asks the reconciler to drop expired cache regions
//! - Error Notification: Reports each new failure classification once

mod notify;
mod sweep;

pub use notify::{spawn_notification_task, ERROR_NOTIFICATION_EVENT};
pub use sweep::spawn_sweep_task;
