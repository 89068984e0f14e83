//! hw-dash library - World happiness dashboard service
//!
//! Wires the KPI source, the fetch coordinator and the view models
//! together, and exposes the result over HTTP and SSE.

use axum::Router;
use hw_common::events::{DashboardEvent, EventBus};
use hw_common::regions::RegionTable;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod coordinator;
pub mod error;
pub mod source;
pub mod views;

pub use coordinator::{FetchCoordinator, PendingFetches, ResourceObserver, ResourceState, ResourceUpdate};
pub use error::{ApiError, FetchError};
pub use source::{HttpKpiSource, KpiSource};
pub use views::{SummaryViewModel, TrendViewModel};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<FetchCoordinator>,
    pub summary: Arc<SummaryViewModel>,
    pub trend: Arc<TrendViewModel>,
    pub events: EventBus,
}

impl AppState {
    /// Build the coordinator and both view models on top of `source`
    ///
    /// The view models are subscribed before anything is fetched, so no
    /// transition is missed.
    pub fn new(source: Arc<dyn KpiSource>, timeout: Duration, events: EventBus) -> Self {
        let coordinator = FetchCoordinator::new(source, timeout, events.clone());
        let summary = SummaryViewModel::new(RegionTable::standard(), events.clone());
        let trend = TrendViewModel::new(events.clone());

        coordinator.subscribe(summary.clone());
        coordinator.subscribe(trend.clone());

        Self {
            coordinator,
            summary,
            trend,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::year_routes())
        .merge(api::view_routes())
        .merge(api::event_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
