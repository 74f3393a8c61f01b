//! Handle used by the map and the application to talk to the reconciler.

use tokio::sync::{mpsc, oneshot, watch};

use crate::cache::CacheStats;
use crate::error::{PlaceError, Result};
use crate::geo::GeoBounds;
use crate::place::PlaceFilter;
use crate::reconciler::VisibleSnapshot;

/// Inputs processed by the reconciler task, in arrival order.
#[derive(Debug)]
pub(crate) enum ViewportEvent {
    BoundsChanged(GeoBounds),
    FilterChanged(PlaceFilter),
    Retry,
    Sweep,
    Stats(oneshot::Sender<CacheStats>),
}

// == Reconciler Handle ==
/// Cloneable front end of a running [`crate::reconciler::ViewportReconciler`].
///
/// Sending never blocks. Every method fails with [`PlaceError::Unknown`]
/// once the reconciler task has stopped.
#[derive(Debug, Clone)]
pub struct ReconcilerHandle {
    events: mpsc::UnboundedSender<ViewportEvent>,
    snapshots: watch::Receiver<VisibleSnapshot>,
}

impl ReconcilerHandle {
    pub(crate) fn new(
        events: mpsc::UnboundedSender<ViewportEvent>,
        snapshots: watch::Receiver<VisibleSnapshot>,
    ) -> Self {
        Self { events, snapshots }
    }

    // == Viewport Changed ==
    /// Reports a new map viewport.
    ///
    /// Invalid bounds are still forwarded so the reconciler can report them,
    /// but the caller gets [`PlaceError::InvalidBounds`] back.
    pub fn viewport_changed(&self, bounds: GeoBounds) -> Result<()> {
        self.send(ViewportEvent::BoundsChanged(bounds))?;
        if bounds.is_valid() {
            Ok(())
        } else {
            Err(PlaceError::InvalidBounds(format!("{:?}", bounds)))
        }
    }

    /// Replaces the active attribute filter.
    pub fn set_filter(&self, filter: PlaceFilter) -> Result<()> {
        self.send(ViewportEvent::FilterChanged(filter))
    }

    /// Re-evaluates the last viewport right away, ignoring the change threshold.
    pub fn retry(&self) -> Result<()> {
        self.send(ViewportEvent::Retry)
    }

    /// Drops expired cache entries.
    pub fn sweep(&self) -> Result<()> {
        self.send(ViewportEvent::Sweep)
    }

    /// Current cache statistics.
    pub async fn stats(&self) -> Result<CacheStats> {
        let (reply, response) = oneshot::channel();
        self.send(ViewportEvent::Stats(reply))?;
        response.await.map_err(|_| stopped())
    }

    // == Published State ==
    /// Latest published snapshot.
    pub fn snapshot(&self) -> VisibleSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<VisibleSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, event: ViewportEvent) -> Result<()> {
        self.events.send(event).map_err(|_| stopped())
    }
}

fn stopped() -> PlaceError {
    PlaceError::Unknown("viewport reconciler has stopped".to_string())
}
