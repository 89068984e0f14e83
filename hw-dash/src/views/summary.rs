//! Summary view model
//!
//! KPI cards, the region donut, and the choropleth map for the selected
//! year. Consumes `summary-kpis`, `happiness-by-region` and `map-data`.

use crate::coordinator::{ResourceObserver, ResourceUpdate};
use crate::views::Panel;
use chrono::Utc;
use hw_common::chart::{ChartKind, ChartSeries, Dataset, SeriesData, SeriesStyle};
use hw_common::events::{DashboardEvent, EventBus};
use hw_common::regions::{aggregate, points_from_parallel, RegionTable};
use hw_common::scoring::{classify, classify_json, score_from_json};
use hw_common::{ColorBucket, Resource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Shown in place of a KPI that is absent or not numeric
pub const PLACEHOLDER: &str = "-";

const INTERESTS: &[Resource] = &[
    Resource::SummaryKpis,
    Resource::HappinessByRegion,
    Resource::MapData,
];

/// Formatted KPI card values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub happiness: String,
    pub gdp: String,
    pub social: String,
}

impl KpiSummary {
    pub fn placeholder() -> Self {
        Self {
            happiness: PLACEHOLDER.to_string(),
            gdp: PLACEHOLDER.to_string(),
            social: PLACEHOLDER.to_string(),
        }
    }

    /// Format `{ happiness?, gdp?, social? }`; anything else is all placeholders
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            happiness: format_kpi(payload.get("happiness")),
            gdp: format_kpi(payload.get("gdp")),
            social: format_kpi(payload.get("social")),
        }
    }
}

/// Two decimals, or the placeholder when the value is missing or not numeric
pub fn format_kpi(value: Option<&Value>) -> String {
    match value.and_then(score_from_json) {
        Some(v) => format!("{:.2}", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// A macro-region average with its display bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRegion {
    pub region: String,
    pub average: f64,
    pub bucket: ColorBucket,
}

/// Region panel contents: the classified averages and the donut built from them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBreakdown {
    pub regions: Vec<ClassifiedRegion>,
    pub chart: ChartSeries,
}

#[derive(Debug, Deserialize)]
struct RegionPayload {
    labels: Vec<String>,
    values: Vec<f64>,
}

/// Aggregate `{ labels, values }` into macro-regions and build the donut
///
/// A payload of the wrong shape produces an empty breakdown.
pub fn build_region_breakdown(payload: &Value, table: &RegionTable) -> RegionBreakdown {
    let points = match RegionPayload::deserialize(payload) {
        Ok(parsed) => points_from_parallel(&parsed.labels, &parsed.values),
        Err(e) => {
            warn!("Malformed happiness-by-region payload, showing empty chart: {}", e);
            Vec::new()
        }
    };

    let regions: Vec<ClassifiedRegion> = aggregate(&points, table)
        .into_iter()
        .map(|agg| ClassifiedRegion {
            bucket: classify(Some(agg.average)),
            region: agg.region,
            average: agg.average,
        })
        .collect();

    let chart = ChartSeries {
        kind: ChartKind::Doughnut,
        title: Some("Happiness by region".to_string()),
        labels: regions.iter().map(|r| r.region.clone()).collect(),
        datasets: vec![Dataset {
            label: "Average happiness".to_string(),
            data: SeriesData::Values(regions.iter().map(|r| r.average).collect()),
            style: SeriesStyle {
                background_colors: regions.iter().map(|r| r.bucket.color().to_string()).collect(),
                border_color: Some("#FFFFFF".to_string()),
                border_width: Some(3),
                hover_offset: Some(6),
                ..Default::default()
            },
        }],
    };

    RegionBreakdown { regions, chart }
}

/// A map record passed through untouched, plus its display bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub record: Value,
    pub bucket: ColorBucket,
}

/// Pair every map record with the bucket of its `score`
///
/// A non-array payload yields no points.
pub fn build_map_points(payload: &Value) -> Vec<MapPoint> {
    let Some(records) = payload.as_array() else {
        warn!("Malformed map-data payload (not an array), showing empty map");
        return Vec::new();
    };

    records
        .iter()
        .map(|record| MapPoint {
            bucket: record
                .get("score")
                .map(classify_json)
                .unwrap_or(ColorBucket::Unknown),
            record: record.clone(),
        })
        .collect()
}

/// One line of the map legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub bucket: ColorBucket,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn map_legend() -> Vec<LegendEntry> {
    ColorBucket::all_variants()
        .iter()
        .map(|bucket| LegendEntry {
            bucket: *bucket,
            label: bucket.display_name(),
            color: bucket.color(),
        })
        .collect()
}

/// Snapshot of the summary page
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub kpis: Panel<KpiSummary>,
    /// None until the first breakdown arrives, and after a failure
    pub regions: Panel<Option<RegionBreakdown>>,
    pub map: Panel<Vec<MapPoint>>,
    pub legend: Vec<LegendEntry>,
}

impl Default for SummaryView {
    fn default() -> Self {
        Self {
            kpis: Panel::new(KpiSummary::placeholder()),
            regions: Panel::new(None),
            map: Panel::new(Vec::new()),
            legend: map_legend(),
        }
    }
}

/// Summary view model
pub struct SummaryViewModel {
    table: RegionTable,
    view: RwLock<Arc<SummaryView>>,
    events: EventBus,
}

impl SummaryViewModel {
    pub fn new(table: RegionTable, events: EventBus) -> Arc<Self> {
        Arc::new(Self {
            table,
            view: RwLock::new(Arc::new(SummaryView::default())),
            events,
        })
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<SummaryView> {
        Arc::clone(&self.view.read())
    }
}

impl ResourceObserver for SummaryViewModel {
    fn interests(&self) -> &'static [Resource] {
        INTERESTS
    }

    fn on_update(&self, update: &ResourceUpdate) {
        let mut view = self.view.write();
        let mut next = SummaryView::clone(&view);

        match update.resource {
            Resource::SummaryKpis => {
                next.kpis
                    .apply(update, KpiSummary::from_payload, KpiSummary::placeholder);
            }
            Resource::HappinessByRegion => {
                next.regions.apply(
                    update,
                    |payload| Some(build_region_breakdown(payload, &self.table)),
                    || None,
                );
            }
            Resource::MapData => {
                next.map.apply(update, build_map_points, Vec::new);
            }
            _ => return,
        }

        *view = Arc::new(next);
        drop(view);

        self.events.emit_lossy(DashboardEvent::ViewUpdated {
            view: "summary".to_string(),
            timestamp: Utc::now(),
        });
    }
}
