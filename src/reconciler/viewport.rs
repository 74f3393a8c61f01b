//! Viewport Reconciler
//!
//! Single task owning the spatial cache and all viewport state. Input
//! arrives as events, fetches run as spawned tasks that report back tagged
//! with the generation they were started for, and results are published on
//! a watch channel.
//!
//! Every significant viewport evaluation mints a new generation. A fetch
//! that completes for an older generation is cached but never published, so
//! the newest viewport always wins regardless of response order.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant, Sleep};
use tracing::{debug, info};

use crate::cache::SpatialCache;
use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, PlaceError};
use crate::fetch::{FetchOutcome, RegionFetcher};
use crate::geo::{is_change_significant, GeoBounds};
use crate::place::{Place, PlaceFilter};
use crate::reconciler::handle::ViewportEvent;
use crate::reconciler::{ReconcilerHandle, ReconcilerSettings, ViewportStatus, VisibleSnapshot};

/// Fetch currently running against the data source.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: u64,
    bounds: GeoBounds,
}

/// Message sent back by a finished fetch task.
#[derive(Debug)]
struct FetchCompletion {
    generation: u64,
    bounds: GeoBounds,
    outcome: FetchOutcome,
}

/// Mutable viewport state. Written only by the reconciler task.
#[derive(Debug)]
struct ViewportState {
    /// Last viewport that passed evaluation
    last_bounds: Option<GeoBounds>,
    /// Newest viewport still waiting for the debounce to settle
    pending_bounds: Option<GeoBounds>,
    generation: u64,
    in_flight: Option<InFlight>,
    /// Current generation missed the cache and waits for a fetch slot
    awaiting_fetch: bool,
    /// Unfiltered places for the current viewport
    candidates: Arc<[Place]>,
    filter: PlaceFilter,
    error: Option<ErrorKind>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            last_bounds: None,
            pending_bounds: None,
            generation: 0,
            in_flight: None,
            awaiting_fetch: false,
            candidates: Vec::<Place>::new().into(),
            filter: PlaceFilter::default(),
            error: None,
        }
    }
}

// == Viewport Reconciler ==
/// Debounces viewport changes and keeps the visible place set current.
pub struct ViewportReconciler {
    settings: ReconcilerSettings,
    cache: SpatialCache,
    fetcher: RegionFetcher,
    diagnostics: Arc<dyn Diagnostics>,
    events: mpsc::UnboundedReceiver<ViewportEvent>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions: mpsc::UnboundedReceiver<FetchCompletion>,
    snapshots: watch::Sender<VisibleSnapshot>,
    debounce: Option<Pin<Box<Sleep>>>,
    state: ViewportState,
}

impl ViewportReconciler {
    // == Spawn ==
    /// Starts the reconciler task.
    ///
    /// The cache is moved into the task and only ever touched there. The task
    /// stops once every [`ReconcilerHandle`] has been dropped.
    pub fn spawn(
        settings: ReconcilerSettings,
        cache: SpatialCache,
        fetcher: RegionFetcher,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> (ReconcilerHandle, JoinHandle<()>) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(VisibleSnapshot::initial());

        let reconciler = Self {
            settings,
            cache,
            fetcher,
            diagnostics,
            events,
            completions_tx,
            completions,
            snapshots,
            debounce: None,
            state: ViewportState::default(),
        };

        let task = tokio::spawn(reconciler.run());
        (ReconcilerHandle::new(events_tx, snapshots_rx), task)
    }

    async fn run(mut self) {
        info!(
            "Viewport reconciler started: debounce={:?}, change_threshold={}, fetch_timeout={:?}",
            self.settings.debounce,
            self.settings.change_threshold,
            self.fetcher.timeout()
        );

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = debounce_elapsed(&mut self.debounce) => {
                    self.debounce = None;
                    self.evaluate(false);
                }
                Some(done) = self.completions.recv() => self.complete_fetch(done),
            }
        }

        info!("Viewport reconciler stopped");
    }

    fn handle_event(&mut self, event: ViewportEvent) {
        match event {
            ViewportEvent::BoundsChanged(bounds) => self.on_bounds_changed(bounds),
            ViewportEvent::FilterChanged(filter) => self.on_filter_changed(filter),
            ViewportEvent::Retry => self.on_retry(),
            ViewportEvent::Sweep => self.on_sweep(),
            ViewportEvent::Stats(reply) => {
                let _ = reply.send(self.cache.stats());
            }
        }
    }

    // == Debouncing ==
    fn on_bounds_changed(&mut self, bounds: GeoBounds) {
        if !bounds.is_valid() {
            let err = PlaceError::InvalidBounds(format!("{:?}", bounds));
            self.diagnostics.log_error(&err, ErrorKind::BoundsCalculation.as_str());
            self.state.error = Some(err.kind());
            self.publish();
            return;
        }

        self.state.pending_bounds = Some(bounds);
        self.debounce = Some(Box::pin(sleep(self.settings.debounce)));
        self.publish();
    }

    // == Evaluating ==
    fn evaluate(&mut self, force: bool) {
        let Some(bounds) = self.state.pending_bounds.take() else {
            self.publish();
            return;
        };

        let significant = is_change_significant(
            self.state.last_bounds.as_ref(),
            &bounds,
            self.settings.change_threshold,
        );
        if !force && !significant {
            debug!("Viewport change below threshold, keeping current places");
            self.publish();
            return;
        }

        self.state.generation += 1;
        self.state.last_bounds = Some(bounds);
        debug!(generation = self.state.generation, "Evaluating viewport {:?}", bounds);

        self.resolve_current();
    }

    // == Resolving ==
    fn resolve_current(&mut self) {
        let Some(bounds) = self.state.last_bounds else {
            return;
        };

        let cached = self.cache.resolve_at(&bounds, now());
        self.serve_or_fetch(cached);
    }

    fn serve_or_fetch(&mut self, cached: Option<Arc<[Place]>>) {
        match cached {
            Some(places) => {
                debug!(generation = self.state.generation, "Viewport served from cache");
                self.state.awaiting_fetch = false;
                self.apply_candidates(places);
            }
            None => {
                self.state.awaiting_fetch = true;
                self.start_fetch_if_idle();
                self.publish();
            }
        }
    }

    // == Fetching ==
    /// Starts a fetch for the current generation unless one is already running.
    fn start_fetch_if_idle(&mut self) {
        if self.state.in_flight.is_some() || !self.state.awaiting_fetch {
            return;
        }
        let Some(bounds) = self.state.last_bounds else {
            return;
        };

        let generation = self.state.generation;
        self.state.awaiting_fetch = false;
        self.state.in_flight = Some(InFlight { generation, bounds });

        let fetcher = self.fetcher.clone();
        let diagnostics = Arc::clone(&self.diagnostics);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let fetch = tokio::spawn(async move { fetcher.fetch_region(&bounds).await });
            let outcome = match fetch.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let err = PlaceError::Unknown(format!("region fetch task failed: {}", err));
                    diagnostics.log_error(&err, err.kind().as_str());
                    FetchOutcome {
                        places: Vec::new(),
                        error: Some(err.kind()),
                    }
                }
            };
            let _ = completions.send(FetchCompletion {
                generation,
                bounds,
                outcome,
            });
        });
    }

    fn complete_fetch(&mut self, done: FetchCompletion) {
        if let Some(in_flight) = self.state.in_flight.take() {
            debug_assert_eq!(in_flight.generation, done.generation);
            debug_assert_eq!(in_flight.bounds, done.bounds);
        }
        let current = done.generation == self.state.generation;

        match done.outcome.error {
            None => {
                let places: Arc<[Place]> = done.outcome.places.into();
                // Valid for its own bounds even when superseded
                self.cache.store_at(done.bounds, Arc::clone(&places), now());

                if current {
                    self.apply_candidates(places);
                } else {
                    debug!(
                        generation = done.generation,
                        current = self.state.generation,
                        "Discarding stale fetch result"
                    );
                    self.diagnostics.log_event(
                        "stale_fetch_discarded",
                        json!({ "generation": done.generation, "current": self.state.generation }),
                    );
                }
            }
            // Already reported by the fetcher
            Some(kind) => {
                if current {
                    self.state.candidates = Vec::<Place>::new().into();
                    self.state.error = Some(kind);
                    self.publish();
                }
            }
        }

        // The waiting generation already counted its lookup
        if !current && self.state.awaiting_fetch {
            let cached = self
                .state
                .last_bounds
                .and_then(|bounds| self.cache.lookup_at(&bounds, now()));
            self.serve_or_fetch(cached);
        }
    }

    // == Filtering ==
    fn on_filter_changed(&mut self, filter: PlaceFilter) {
        self.state.filter = filter;
        self.publish();
    }

    fn apply_candidates(&mut self, places: Arc<[Place]>) {
        self.state.candidates = places;
        self.state.error = None;
        self.publish();
    }

    fn visible_places(&self) -> Vec<Place> {
        let Some(bounds) = self.state.last_bounds else {
            return Vec::new();
        };

        self.state
            .candidates
            .iter()
            .filter(|place| bounds.contains(&place.location))
            .filter(|place| self.state.filter.is_empty() || self.state.filter.matches(place))
            .cloned()
            .collect()
    }

    fn fetch_pending(&self) -> bool {
        self.state.awaiting_fetch
            || self
                .state
                .in_flight
                .is_some_and(|f| f.generation == self.state.generation)
    }

    // == Publishing ==
    fn publish(&mut self) {
        let places = self.visible_places();

        let status = if self.debounce.is_some() {
            ViewportStatus::Panning
        } else if self.state.last_bounds.is_none() {
            ViewportStatus::NeedsSearch
        } else if self.fetch_pending() {
            ViewportStatus::Loading
        } else {
            ViewportStatus::classify(places.len(), self.settings.many_threshold)
        };

        self.snapshots.send_replace(VisibleSnapshot {
            places,
            status,
            error: self.state.error,
            bounds: self.state.last_bounds,
            generation: self.state.generation,
            updated_at: Utc::now(),
        });
    }

    // == Caller-driven actions ==
    fn on_retry(&mut self) {
        let Some(bounds) = self.state.pending_bounds.or(self.state.last_bounds) else {
            return;
        };

        info!("Retrying viewport {:?}", bounds);
        self.debounce = None;
        self.state.pending_bounds = Some(bounds);
        self.evaluate(true);
    }

    fn on_sweep(&mut self) {
        let removed = self.cache.sweep_expired_at(now());
        if removed > 0 {
            info!("Cache sweep: removed {} expired regions", removed);
        } else {
            debug!("Cache sweep: no expired regions found");
        }
    }
}

/// Resolves when the debounce timer fires; never resolves without one.
async fn debounce_elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

/// Current instant on the runtime clock, so paused test time applies.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
