//! View models
//!
//! Each view model subscribes to a set of resources on the coordinator and
//! turns their raw payloads into chart-ready structures. A view is
//! published as an immutable `Arc` snapshot; every update builds a new
//! snapshot and swaps it in, so readers never observe a half-updated view.

pub mod summary;
pub mod trend;

pub use summary::{SummaryView, SummaryViewModel};
pub use trend::{TrendView, TrendViewModel};

use crate::coordinator::{ResourceState, ResourceUpdate};
use hw_common::{ResourceStatus, Year};
use serde::Serialize;
use serde_json::Value;

/// One panel of a view: its data plus where that data came from
#[derive(Debug, Clone, Serialize)]
pub struct Panel<T> {
    pub status: ResourceStatus,
    /// Year of the request that produced `data`
    pub year: Option<Year>,
    pub data: T,
}

impl<T> Panel<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: ResourceStatus::Idle,
            year: None,
            data,
        }
    }

    /// Fold a coordinator update into this panel
    ///
    /// `loading` keeps the current data on screen; `ready` rebuilds it from
    /// the payload; `unavailable` swaps in the placeholder.
    pub fn apply(
        &mut self,
        update: &ResourceUpdate,
        build: impl FnOnce(&Value) -> T,
        placeholder: impl FnOnce() -> T,
    ) {
        self.status = update.state.status();
        match &update.state {
            ResourceState::Loading => {}
            ResourceState::Ready(payload) => {
                self.data = build(payload.as_ref());
                self.year = update.year;
            }
            ResourceState::Unavailable(_) => {
                self.data = placeholder();
                self.year = update.year;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_common::Resource;
    use serde_json::json;
    use std::sync::Arc;

    fn update(state: ResourceState) -> ResourceUpdate {
        ResourceUpdate {
            resource: Resource::MapData,
            year: Some(Year::new(2020).unwrap()),
            epoch: 1,
            state,
        }
    }

    #[test]
    fn test_panel_lifecycle() {
        let mut panel: Panel<usize> = Panel::new(0);

        panel.apply(
            &update(ResourceState::Ready(Arc::new(json!([1, 2, 3])))),
            |v| v.as_array().map(Vec::len).unwrap_or(0),
            || 0,
        );
        assert_eq!(panel.status, ResourceStatus::Ready);
        assert_eq!(panel.data, 3);

        // Loading keeps the previous data
        panel.apply(&update(ResourceState::Loading), |_| 99, || 0);
        assert_eq!(panel.status, ResourceStatus::Loading);
        assert_eq!(panel.data, 3);

        panel.apply(&update(ResourceState::Unavailable("boom".into())), |_| 99, || 0);
        assert_eq!(panel.status, ResourceStatus::Unavailable);
        assert_eq!(panel.data, 0);
    }
}
