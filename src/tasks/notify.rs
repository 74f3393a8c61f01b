//! Error Notification Task
//!
//! Watches published snapshots and raises one notification each time a new
//! failure classification appears, so a flaky source does not repeat the
//! same message on every retry.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::error::ErrorKind;
use crate::reconciler::ReconcilerHandle;

/// Event name used for user-facing error notifications.
pub const ERROR_NOTIFICATION_EVENT: &str = "error_notification";

/// Spawns a task that turns snapshot error changes into notification events.
///
/// The task ends once the reconciler has stopped publishing.
pub fn spawn_notification_task(
    reconciler: &ReconcilerHandle,
    diagnostics: Arc<dyn Diagnostics>,
) -> JoinHandle<()> {
    let mut snapshots = reconciler.subscribe();

    tokio::spawn(async move {
        info!("Starting error notification task");
        let mut last_error: Option<ErrorKind> = snapshots.borrow().error;

        while snapshots.changed().await.is_ok() {
            let (error, generation) = {
                let snapshot = snapshots.borrow_and_update();
                (snapshot.error, snapshot.generation)
            };

            if error != last_error {
                if let Some(kind) = error {
                    diagnostics.log_event(
                        ERROR_NOTIFICATION_EVENT,
                        json!({ "kind": kind, "generation": generation }),
                    );
                }
                last_error = error;
            }
        }

        debug!("Error notification task stopping: reconciler closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::cache::SpatialCache;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::error::SourceError;
    use crate::fetch::{InMemorySource, RegionFetcher};
    use crate::geo::GeoBounds;
    use crate::reconciler::{ReconcilerSettings, ViewportReconciler};

    fn spawn_reconciler(source: Arc<InMemorySource>) -> (ReconcilerHandle, JoinHandle<()>) {
        let fetcher = RegionFetcher::new(
            source,
            Arc::new(RecordingDiagnostics::new()),
            Duration::from_secs(15),
        );
        ViewportReconciler::spawn(
            ReconcilerSettings::default(),
            SpatialCache::new(20, Duration::from_secs(300)),
            fetcher,
            Arc::new(RecordingDiagnostics::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifies_once_per_new_error() {
        let source = Arc::new(InMemorySource::new(Vec::new()));
        source.fail_with(Some(SourceError::Backend("quota exceeded".to_string())));
        let (reconciler, _task) = spawn_reconciler(source.clone());
        let notifications = Arc::new(RecordingDiagnostics::new());
        let _notify = spawn_notification_task(&reconciler, notifications.clone());

        reconciler
            .viewport_changed(GeoBounds::new(10.0, 0.0, 10.0, 0.0))
            .unwrap();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(notifications.event_count(ERROR_NOTIFICATION_EVENT), 1);
        assert_eq!(notifications.events()[0].params["kind"], "firebase_error");

        // Same failure again
        reconciler.retry().unwrap();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(notifications.event_count(ERROR_NOTIFICATION_EVENT), 1);

        // Recovery clears the error, the next failure notifies again
        source.fail_with(None);
        reconciler.retry().unwrap();
        sleep(Duration::from_secs(2)).await;
        source.fail_with(Some(SourceError::Network("offline".to_string())));
        reconciler.retry().unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(notifications.event_count(ERROR_NOTIFICATION_EVENT), 2);
        assert_eq!(notifications.events()[1].params["kind"], "network_error");
    }

    #[tokio::test]
    async fn test_task_exits_when_reconciler_stops() {
        let (reconciler, task) = spawn_reconciler(Arc::new(InMemorySource::new(Vec::new())));
        let notify = spawn_notification_task(&reconciler, Arc::new(RecordingDiagnostics::new()));

        task.abort();
        let _ = task.await;
        drop(reconciler);

        tokio::time::timeout(Duration::from_secs(1), notify)
            .await
            .expect("notification task should stop")
            .unwrap();
    }
}
