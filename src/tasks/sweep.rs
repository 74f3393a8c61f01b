//! Cache Sweep Task
//!
//! Background task that periodically asks the reconciler to remove expired
//! regions from its cache. Lookups already ignore expired regions; the sweep
//! only reclaims their memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::reconciler::ReconcilerHandle;

/// Spawns a background task that periodically requests a cache sweep.
///
/// The cache itself stays owned by the reconciler task; this task only sends
/// it a sweep request every `sweep_interval`. It exits on its own once the
/// reconciler has stopped.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let sweep_handle = spawn_sweep_task(reconciler.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(reconciler: ReconcilerHandle, sweep_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", sweep_interval);

        loop {
            tokio::time::sleep(sweep_interval).await;

            if let Err(err) = reconciler.sweep() {
                warn!("Cache sweep task stopping: {}", err);
                break;
            }
            debug!("Cache sweep requested");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::SpatialCache;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::fetch::{InMemorySource, RegionFetcher};
    use crate::geo::GeoBounds;
    use crate::place::RawRecord;
    use crate::reconciler::{ReconcilerSettings, ViewportReconciler};
    use serde_json::json;

    fn spawn_reconciler(expiration: Duration) -> (ReconcilerHandle, JoinHandle<()>) {
        let source = Arc::new(InMemorySource::new(vec![RawRecord::new(
            "p1",
            json!({ "name": "Park", "location": { "latitude": 5.0, "longitude": 5.0 } }),
        )]));
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let fetcher = RegionFetcher::new(source, diagnostics.clone(), Duration::from_secs(15));
        ViewportReconciler::spawn(
            ReconcilerSettings::default(),
            SpatialCache::new(20, expiration),
            fetcher,
            diagnostics,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_removes_expired_regions() {
        let (reconciler, _task) = spawn_reconciler(Duration::from_secs(5));

        reconciler
            .viewport_changed(GeoBounds::new(10.0, 0.0, 10.0, 0.0))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(reconciler.stats().await.unwrap().total_entries, 1);

        let handle = spawn_sweep_task(reconciler.clone(), Duration::from_secs(1));

        // Wait for the region to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(6500)).await;

        let stats = reconciler.stats().await.unwrap();
        assert_eq!(stats.total_entries, 0, "Expired region should have been swept");
        assert_eq!(stats.expired, 1);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_preserves_live_regions() {
        let (reconciler, _task) = spawn_reconciler(Duration::from_secs(3600));

        reconciler
            .viewport_changed(GeoBounds::new(10.0, 0.0, 10.0, 0.0))
            .unwrap();
        let handle = spawn_sweep_task(reconciler.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;

        let stats = reconciler.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1, "Live region should not be removed");

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_exits_when_reconciler_stops() {
        let (reconciler, task) = spawn_reconciler(Duration::from_secs(60));
        let handle = spawn_sweep_task(reconciler, Duration::from_secs(1));

        task.abort();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(handle.is_finished(), "Sweep task should stop with the reconciler");
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (reconciler, _task) = spawn_reconciler(Duration::from_secs(60));
        let handle = spawn_sweep_task(reconciler, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
