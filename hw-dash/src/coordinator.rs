//! Fetch coordinator
//!
//! Owns the selected year and every year-dependent request. Each request
//! gets an epoch from a monotonically increasing counter, and each resource
//! remembers the epoch of its newest request. When a fetch resolves, its
//! result is applied only if its epoch is still the newest for that
//! resource: the last *issued* request wins, whatever order the network
//! answers in. Older results are dropped without touching visible state.
//!
//! Resources are independent. A failure or timeout marks one resource
//! unavailable and never blocks the others. There are no automatic
//! retries; `set_year` or `refresh` are the recovery paths.
//!
//! The selected year is written only by `set_year` and `initialize`. Fetch
//! completions never write it, and `initialize` only applies its
//! data-driven default when no `set_year` happened while it was loading.
//!
//! Observers are called synchronously while the coordinator state lock is
//! held, so they see one resource's transitions in order. An observer must
//! not call back into the coordinator.

use crate::error::FetchError;
use crate::source::KpiSource;
use chrono::Utc;
use hw_common::events::{DashboardEvent, EventBus};
use hw_common::{Resource, ResourceStatus, Result, Year};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Payload state carried by a resource update
#[derive(Debug, Clone)]
pub enum ResourceState {
    /// A new request was issued; previous data stays on screen
    Loading,
    /// Fresh payload for the request's year
    Ready(Arc<Value>),
    /// Request failed; the panel falls back to its placeholder
    Unavailable(String),
}

impl ResourceState {
    pub fn status(&self) -> ResourceStatus {
        match self {
            ResourceState::Loading => ResourceStatus::Loading,
            ResourceState::Ready(_) => ResourceStatus::Ready,
            ResourceState::Unavailable(_) => ResourceStatus::Unavailable,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ResourceState::Ready(payload) => Some(payload.as_ref()),
            _ => None,
        }
    }
}

/// Notification delivered to observers on every accepted transition
#[derive(Debug, Clone)]
pub struct ResourceUpdate {
    pub resource: Resource,
    /// Year the request was issued for (None for year-independent resources)
    pub year: Option<Year>,
    pub epoch: u64,
    pub state: ResourceState,
}

/// A consumer of coordinator output (the view models)
pub trait ResourceObserver: Send + Sync {
    /// Resources this observer wants updates for
    fn interests(&self) -> &'static [Resource];

    /// Called synchronously after each accepted transition
    fn on_update(&self, update: &ResourceUpdate);
}

/// Bookkeeping for one resource
#[derive(Debug, Default, Clone, Copy)]
struct ResourceSlot {
    /// Epoch of the newest issued request (0 = never requested)
    epoch: u64,
    status: ResourceStatus,
    year: Option<Year>,
}

struct CoordinatorState {
    year: Year,
    available_years: Vec<Year>,
    empty_state: bool,
    /// Bumped by every accepted `set_year` call
    selections: u64,
    next_epoch: u64,
    slots: HashMap<Resource, ResourceSlot>,
    observers: Vec<Arc<dyn ResourceObserver>>,
}

/// A request registered under the lock, ready to be dispatched
#[derive(Debug, Clone, Copy)]
struct IssuedRequest {
    resource: Resource,
    year: Option<Year>,
    epoch: u64,
}

/// Handles of the fetches started by one coordinator call
///
/// Dropping it does not cancel anything; awaiting `settled` waits until
/// every fetch has resolved and been applied or discarded.
#[derive(Debug, Default)]
pub struct PendingFetches {
    handles: Vec<(Resource, JoinHandle<()>)>,
}

impl PendingFetches {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.handles.iter().map(|(resource, _)| *resource).collect()
    }

    /// Wait for every fetch in this batch to resolve
    pub async fn settled(self) {
        for (resource, handle) in self.handles {
            if let Err(e) = handle.await {
                warn!(resource = %resource, "Fetch task ended abnormally: {}", e);
            }
        }
    }
}

/// Year selection owner and request orchestrator
pub struct FetchCoordinator {
    source: Arc<dyn KpiSource>,
    timeout: Duration,
    events: EventBus,
    state: Mutex<CoordinatorState>,
}

impl FetchCoordinator {
    /// Create a coordinator with the static default year
    pub fn new(source: Arc<dyn KpiSource>, timeout: Duration, events: EventBus) -> Arc<Self> {
        Arc::new(Self {
            source,
            timeout,
            events,
            state: Mutex::new(CoordinatorState {
                year: Year::default(),
                available_years: Vec::new(),
                empty_state: false,
                selections: 0,
                next_epoch: 0,
                slots: HashMap::new(),
                observers: Vec::new(),
            }),
        })
    }

    /// Register an observer for its declared resources
    pub fn subscribe(&self, observer: Arc<dyn ResourceObserver>) {
        self.state.lock().observers.push(observer);
    }

    pub fn year(&self) -> Year {
        self.state.lock().year
    }

    /// Years present in the evolution data, newest first
    pub fn available_years(&self) -> Vec<Year> {
        self.state.lock().available_years.clone()
    }

    /// True when startup data was missing and the static default is in use
    pub fn is_empty_state(&self) -> bool {
        self.state.lock().empty_state
    }

    pub fn status(&self, resource: Resource) -> ResourceStatus {
        self.state
            .lock()
            .slots
            .get(&resource)
            .map(|slot| slot.status)
            .unwrap_or_default()
    }

    /// Epoch of the newest request for `resource` (0 if never requested)
    pub fn epoch(&self, resource: Resource) -> u64 {
        self.state
            .lock()
            .slots
            .get(&resource)
            .map(|slot| slot.epoch)
            .unwrap_or(0)
    }

    /// Load the evolution series once and pick the starting year
    ///
    /// On success the year becomes the most recent valid year in the data.
    /// On failure or empty data the static default stays and the empty
    /// state flag is raised. A year picked with `set_year` while the
    /// evolution fetch was in flight takes precedence over both.
    ///
    /// Afterwards every year-scoped resource that has not been requested
    /// since initialization began is requested for the resulting year.
    pub async fn initialize(self: &Arc<Self>) -> PendingFetches {
        let (request, selections_at_start) = {
            let mut state = self.state.lock();
            let selections = state.selections;
            (
                self.begin_request(&mut state, Resource::GlobalEvolution, None),
                selections,
            )
        };

        let result = self.fetch_bounded(request).await;
        let applied = self.on_result(request.resource, request.epoch, result);

        let requests = {
            let mut state = self.state.lock();
            let user_selected = state.selections != selections_at_start;

            if !applied {
                debug!("Initialization superseded by a newer evolution request");
            } else if user_selected {
                info!(year = %state.year, "Keeping year selected during initialization");
                if !state.available_years.is_empty() {
                    state.empty_state = false;
                }
            } else {
                match state.available_years.first().copied() {
                    Some(latest) => {
                        state.empty_state = false;
                        info!(year = %latest, "Selected most recent year from evolution data");
                        if state.year != latest {
                            state.year = latest;
                            self.events.emit_lossy(DashboardEvent::YearChanged {
                                year: latest,
                                timestamp: Utc::now(),
                            });
                        }
                    }
                    None => {
                        warn!(year = %state.year, "No evolution data available, keeping default year");
                        state.empty_state = true;
                        self.events.emit_lossy(DashboardEvent::EmptyState {
                            reason: "global evolution data unavailable".to_string(),
                            timestamp: Utc::now(),
                        });
                    }
                }
            }

            let year = state.year;
            // Resources requested meanwhile (set_year, refresh) are left alone
            let unrequested: Vec<Resource> = Resource::YEAR_SCOPED
                .into_iter()
                .filter(|resource| {
                    state
                        .slots
                        .get(resource)
                        .map_or(true, |slot| slot.epoch < request.epoch)
                })
                .collect();
            unrequested
                .into_iter()
                .map(|resource| self.begin_request(&mut state, resource, Some(year)))
                .collect::<Vec<_>>()
        };

        self.dispatch(requests)
    }

    /// Select a year and re-fetch every year-scoped resource
    ///
    /// Out-of-range years are rejected without side effects. Selecting the
    /// current year is a no-op and returns an empty batch.
    pub fn set_year(self: &Arc<Self>, year: i32) -> Result<PendingFetches> {
        let year = Year::new(year).map_err(|e| {
            warn!("Rejected year selection: {}", e);
            e
        })?;

        let requests = {
            let mut state = self.state.lock();
            state.selections += 1;
            if state.year == year {
                debug!(year = %year, "Year unchanged, skipping refetch");
                return Ok(PendingFetches::default());
            }

            info!(from = %state.year, to = %year, "Year selection changed");
            state.year = year;
            self.events.emit_lossy(DashboardEvent::YearChanged {
                year,
                timestamp: Utc::now(),
            });

            Resource::YEAR_SCOPED
                .iter()
                .map(|&resource| self.begin_request(&mut state, resource, Some(year)))
                .collect::<Vec<_>>()
        };

        Ok(self.dispatch(requests))
    }

    /// Re-issue every year-scoped request for the current year
    pub fn refresh(self: &Arc<Self>) -> PendingFetches {
        let requests = {
            let mut state = self.state.lock();
            let year = state.year;
            info!(year = %year, "Manual refresh");
            Resource::YEAR_SCOPED
                .iter()
                .map(|&resource| self.begin_request(&mut state, resource, Some(year)))
                .collect::<Vec<_>>()
        };

        self.dispatch(requests)
    }

    /// Re-issue a single resource
    pub fn refresh_resource(self: &Arc<Self>, resource: Resource) -> PendingFetches {
        let request = {
            let mut state = self.state.lock();
            let year = resource.is_year_scoped().then_some(state.year);
            self.begin_request(&mut state, resource, year)
        };

        self.dispatch(vec![request])
    }

    /// Apply a resolved fetch if it is still the newest for its resource
    ///
    /// Returns `true` when the result was applied, `false` when it was
    /// discarded as stale.
    pub fn on_result(
        &self,
        resource: Resource,
        epoch: u64,
        result: std::result::Result<Value, FetchError>,
    ) -> bool {
        let mut state = self.state.lock();

        let slot = state.slots.entry(resource).or_default();
        if epoch != slot.epoch || slot.status != ResourceStatus::Loading {
            debug!(
                resource = %resource,
                epoch,
                latest = slot.epoch,
                "Discarding stale result"
            );
            return false;
        }

        let resource_state = match result {
            Ok(payload) => {
                debug!(resource = %resource, epoch, "Applying result");
                ResourceState::Ready(Arc::new(payload))
            }
            Err(e) => {
                warn!(resource = %resource, epoch, "Resource unavailable: {}", e);
                ResourceState::Unavailable(e.to_string())
            }
        };
        slot.status = resource_state.status();
        let year = slot.year;

        if let (Resource::GlobalEvolution, Some(payload)) = (resource, resource_state.payload()) {
            state.available_years = years_in_evolution(payload);
        }

        let update = ResourceUpdate {
            resource,
            year,
            epoch,
            state: resource_state,
        };
        self.publish(&state, &update);
        true
    }

    /// Register a new request: bump the epoch and enter `loading`
    fn begin_request(
        &self,
        state: &mut CoordinatorState,
        resource: Resource,
        year: Option<Year>,
    ) -> IssuedRequest {
        state.next_epoch += 1;
        let epoch = state.next_epoch;
        state.slots.insert(
            resource,
            ResourceSlot {
                epoch,
                status: ResourceStatus::Loading,
                year,
            },
        );

        let update = ResourceUpdate {
            resource,
            year,
            epoch,
            state: ResourceState::Loading,
        };
        self.publish(state, &update);

        IssuedRequest {
            resource,
            year,
            epoch,
        }
    }

    /// Notify interested observers and the event bus
    fn publish(&self, state: &CoordinatorState, update: &ResourceUpdate) {
        for observer in &state.observers {
            if observer.interests().contains(&update.resource) {
                observer.on_update(update);
            }
        }

        self.events.emit_lossy(DashboardEvent::ResourceStateChanged {
            resource: update.resource,
            status: update.state.status(),
            year: update.year,
            epoch: update.epoch,
            timestamp: Utc::now(),
        });
    }

    /// Spawn one task per request; each reports back through `on_result`
    fn dispatch(self: &Arc<Self>, requests: Vec<IssuedRequest>) -> PendingFetches {
        let handles = requests
            .into_iter()
            .map(|request| {
                let coordinator = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    let result = coordinator.fetch_bounded(request).await;
                    coordinator.on_result(request.resource, request.epoch, result);
                });
                (request.resource, handle)
            })
            .collect();

        PendingFetches { handles }
    }

    async fn fetch_bounded(&self, request: IssuedRequest) -> std::result::Result<Value, FetchError> {
        match tokio::time::timeout(self.timeout, self.source.fetch(request.resource, request.year))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }
}

/// Valid years in an evolution payload, newest first, deduplicated
///
/// Rows without a usable `year` and years outside the supported range are
/// ignored. A non-array payload yields no years.
pub fn years_in_evolution(payload: &Value) -> Vec<Year> {
    let Some(rows) = payload.as_array() else {
        return Vec::new();
    };

    let mut years: Vec<Year> = rows
        .iter()
        .filter_map(|row| row.get("year")?.as_i64())
        .filter_map(|year| i32::try_from(year).ok())
        .filter_map(|year| Year::new(year).ok())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
