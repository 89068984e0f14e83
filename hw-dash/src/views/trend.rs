//! Trend view model
//!
//! The global evolution line (all years, fetched once) and the GDP vs
//! happiness scatter for the selected year.

use crate::coordinator::{years_in_evolution, ResourceObserver, ResourceUpdate};
use crate::views::Panel;
use chrono::Utc;
use hw_common::chart::{ChartKind, ChartSeries, Dataset, ScatterPoint, SeriesData, SeriesStyle};
use hw_common::events::{DashboardEvent, EventBus};
use hw_common::scoring::score_from_json;
use hw_common::{Resource, ResourceStatus, Year};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const INTERESTS: &[Resource] = &[Resource::GlobalEvolution, Resource::CorrelationData];

const EVOLUTION_TITLE: &str = "Global happiness average (2015-2024)";

/// Build the evolution line from `[{year, score}]`, sorted ascending by year
///
/// Rows missing a numeric year or score are skipped.
pub fn build_evolution_chart(payload: &Value) -> ChartSeries {
    let Some(rows) = payload.as_array() else {
        warn!("Malformed global-evolution payload (not an array), showing empty chart");
        return ChartSeries::empty(ChartKind::Line).with_title(EVOLUTION_TITLE);
    };

    let mut samples: Vec<(i64, f64)> = rows
        .iter()
        .filter_map(|row| {
            let year = row.get("year")?.as_i64()?;
            let score = score_from_json(row.get("score")?)?;
            Some((year, score))
        })
        .collect();

    if samples.len() < rows.len() {
        debug!(
            skipped = rows.len() - samples.len(),
            "Skipped malformed global-evolution rows"
        );
    }

    samples.sort_by_key(|(year, _)| *year);

    ChartSeries {
        kind: ChartKind::Line,
        title: Some(EVOLUTION_TITLE.to_string()),
        labels: samples.iter().map(|(year, _)| year.to_string()).collect(),
        datasets: vec![Dataset {
            label: "Global happiness average".to_string(),
            data: SeriesData::Values(samples.iter().map(|(_, score)| *score).collect()),
            style: SeriesStyle {
                background_colors: vec!["rgba(53, 162, 235, 0.5)".to_string()],
                border_color: Some("#118AB2".to_string()),
                tension: Some(0.4),
                ..Default::default()
            },
        }],
    }
}

/// Build the GDP vs happiness scatter from `[{x, y}]`
///
/// A payload that is not a list yields an empty series; rows without
/// numeric `x` and `y` are skipped.
pub fn build_correlation_chart(payload: &Value, year: Option<Year>) -> ChartSeries {
    let title = match year {
        Some(year) => format!("GDP per capita vs happiness index ({})", year),
        None => "GDP per capita vs happiness index".to_string(),
    };

    let points: Vec<ScatterPoint> = match payload.as_array() {
        Some(rows) => rows
            .iter()
            .filter_map(|row| {
                Some(ScatterPoint {
                    x: score_from_json(row.get("x")?)?,
                    y: score_from_json(row.get("y")?)?,
                })
            })
            .collect(),
        None => {
            warn!("Malformed correlation-data payload (not an array), showing empty chart");
            Vec::new()
        }
    };

    ChartSeries {
        kind: ChartKind::Scatter,
        title: Some(title),
        labels: Vec::new(),
        datasets: vec![Dataset {
            label: "Countries".to_string(),
            data: SeriesData::Points(points),
            style: SeriesStyle {
                background_colors: vec!["rgba(3, 110, 250, 0.61)".to_string()],
                point_radius: Some(6),
                ..Default::default()
            },
        }],
    }
}

/// Snapshot of the trend page
#[derive(Debug, Clone, Serialize)]
pub struct TrendView {
    pub evolution: Panel<Option<ChartSeries>>,
    /// Years with evolution data, newest first
    pub available_years: Vec<Year>,
    pub correlation: Panel<Option<ChartSeries>>,
}

impl TrendView {
    pub fn correlation_loading(&self) -> bool {
        self.correlation.status == ResourceStatus::Loading
    }
}

impl Default for TrendView {
    fn default() -> Self {
        Self {
            evolution: Panel::new(None),
            available_years: Vec::new(),
            correlation: Panel::new(None),
        }
    }
}

/// Trend view model
pub struct TrendViewModel {
    view: RwLock<Arc<TrendView>>,
    events: EventBus,
}

impl TrendViewModel {
    pub fn new(events: EventBus) -> Arc<Self> {
        Arc::new(Self {
            view: RwLock::new(Arc::new(TrendView::default())),
            events,
        })
    }

    pub fn snapshot(&self) -> Arc<TrendView> {
        Arc::clone(&self.view.read())
    }
}

impl ResourceObserver for TrendViewModel {
    fn interests(&self) -> &'static [Resource] {
        INTERESTS
    }

    fn on_update(&self, update: &ResourceUpdate) {
        let mut view = self.view.write();
        let mut next = TrendView::clone(&view);

        match update.resource {
            Resource::GlobalEvolution => {
                next.evolution
                    .apply(update, |payload| Some(build_evolution_chart(payload)), || None);
                if let Some(payload) = update.state.payload() {
                    next.available_years = years_in_evolution(payload);
                }
            }
            Resource::CorrelationData => {
                let year = update.year;
                next.correlation.apply(
                    update,
                    |payload| Some(build_correlation_chart(payload, year)),
                    || None,
                );
            }
            _ => return,
        }

        *view = Arc::new(next);
        drop(view);

        self.events.emit_lossy(DashboardEvent::ViewUpdated {
            view: "trend".to_string(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::ResourceState;
    use serde_json::json;

    fn update(resource: Resource, year: Option<i32>, state: ResourceState) -> ResourceUpdate {
        ResourceUpdate {
            resource,
            year: year.map(|y| Year::new(y).unwrap()),
            epoch: 1,
            state,
        }
    }

    #[test]
    fn test_evolution_sorted_ascending() {
        let chart = build_evolution_chart(&json!([
            {"year": 2016, "score": 5.4},
            {"year": 2015, "score": 5.2}
        ]));

        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.labels, vec!["2015", "2016"]);
        assert_eq!(chart.datasets[0].data, SeriesData::Values(vec![5.2, 5.4]));
        assert_eq!(chart.datasets[0].style.tension, Some(0.4));
    }

    #[test]
    fn test_evolution_skips_bad_rows() {
        let chart = build_evolution_chart(&json!([
            {"year": 2017, "score": 5.5},
            {"year": "soon", "score": 5.0},
            {"score": 4.0},
            {"year": 2018, "score": null}
        ]));

        assert_eq!(chart.labels, vec!["2017"]);
        assert!(build_evolution_chart(&json!({"error": "x"})).is_empty());
    }

    #[test]
    fn test_correlation_points() {
        let chart = build_correlation_chart(
            &json!([{"x": 1.2, "y": 6.1}, {"x": "0.4", "y": 4.2}, {"x": 3}]),
            Some(Year::new(2019).unwrap()),
        );

        assert_eq!(chart.kind, ChartKind::Scatter);
        assert_eq!(
            chart.title.as_deref(),
            Some("GDP per capita vs happiness index (2019)")
        );
        assert_eq!(
            chart.datasets[0].data,
            SeriesData::Points(vec![
                ScatterPoint { x: 1.2, y: 6.1 },
                ScatterPoint { x: 0.4, y: 4.2 },
            ])
        );
    }

    #[test]
    fn test_correlation_object_payload_is_empty_series() {
        let chart = build_correlation_chart(&json!({}), None);
        assert!(chart.is_empty());
        assert_eq!(chart.datasets.len(), 1);
    }

    #[test]
    fn test_view_tracks_available_years_and_loading() {
        let vm = TrendViewModel::new(EventBus::new(8));

        vm.on_update(&update(
            Resource::GlobalEvolution,
            None,
            ResourceState::Ready(Arc::new(json!([
                {"year": 2019, "score": 5.4},
                {"year": 2023, "score": 5.6}
            ]))),
        ));
        vm.on_update(&update(Resource::CorrelationData, Some(2023), ResourceState::Loading));

        let view = vm.snapshot();
        assert_eq!(view.available_years, vec![Year::new(2023).unwrap(), Year::new(2019).unwrap()]);
        assert!(view.evolution.data.is_some());
        assert!(view.correlation_loading());
        assert!(view.correlation.data.is_none());
    }

    #[test]
    fn test_unavailable_correlation_clears_chart() {
        let vm = TrendViewModel::new(EventBus::new(8));
        vm.on_update(&update(
            Resource::CorrelationData,
            Some(2020),
            ResourceState::Ready(Arc::new(json!([{"x": 1.0, "y": 5.0}]))),
        ));
        vm.on_update(&update(
            Resource::CorrelationData,
            Some(2021),
            ResourceState::Unavailable("API error 500".to_string()),
        ));

        let view = vm.snapshot();
        assert!(view.correlation.data.is_none());
        assert_eq!(view.correlation.year, Some(Year::new(2021).unwrap()));
        assert!(!view.correlation_loading());
    }
}
