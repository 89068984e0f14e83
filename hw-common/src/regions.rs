//! Region aggregation
//!
//! The API reports happiness per World Happiness Report sub-region
//! ("Western Europe", "Southeast Asia", ...). The dashboard shows six
//! macro-regions instead, so sub-region values are grouped through a
//! static label table and averaged. Labels missing from the table are
//! dropped rather than collected into an "other" bucket.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A labelled metric value as returned by the API, before aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeriesPoint {
    pub label: String,
    pub value: f64,
}

impl RawSeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Average score of one macro-region, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: String,
    pub average: f64,
}

/// Label → macro-region lookup table
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: HashMap<String, String>,
}

/// Sub-region labels and the macro-region each belongs to
const STANDARD_REGIONS: &[(&str, &str)] = &[
    ("Western Europe", "Europe"),
    ("Central and Eastern Europe", "Europe"),
    ("Central & Eastern Europe", "Europe"),
    ("Commonwealth of Independent States", "Europe"),
    ("North America", "North America"),
    ("Oceania", "Oceania"),
    ("Latin America and Caribbean", "Latin America"),
    ("East Asia", "Asia"),
    ("Southeast Asia", "Asia"),
    ("South Asia", "Asia"),
    ("Middle East and North Africa", "Middle East & Africa"),
    ("Sub-Saharan Africa", "Middle East & Africa"),
];

impl RegionTable {
    /// The table used by the dashboard
    pub fn standard() -> Self {
        Self::from_pairs(STANDARD_REGIONS.iter().copied())
    }

    /// Build a table from (label, region) pairs
    pub fn from_pairs<L, R>(pairs: impl IntoIterator<Item = (L, R)>) -> Self
    where
        L: Into<String>,
        R: Into<String>,
    {
        Self {
            regions: pairs
                .into_iter()
                .map(|(label, region)| (label.into(), region.into()))
                .collect(),
        }
    }

    /// Macro-region for a label, if the label is mapped
    pub fn region_for(&self, label: &str) -> Option<&str> {
        self.regions.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Group points by macro-region and average each group
///
/// Output follows the order in which each region is first seen in
/// `points`. Unmapped labels are skipped.
pub fn aggregate(points: &[RawSeriesPoint], table: &RegionTable) -> Vec<RegionAggregate> {
    // (region, sum, count) in first-seen order
    let mut groups: Vec<(&str, f64, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for point in points {
        let Some(region) = table.region_for(&point.label) else {
            continue;
        };

        let slot = *index.entry(region).or_insert_with(|| {
            groups.push((region, 0.0, 0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.1 += point.value;
        group.2 += 1;
    }

    groups
        .into_iter()
        .map(|(region, sum, count)| RegionAggregate {
            region: region.to_string(),
            average: round2(sum / f64::from(count)),
        })
        .collect()
}

/// Zip the API's parallel `labels`/`values` arrays into points
///
/// Arrays of different length are truncated to the shorter one.
pub fn points_from_parallel(labels: &[String], values: &[f64]) -> Vec<RawSeriesPoint> {
    if labels.len() != values.len() {
        warn!(
            labels = labels.len(),
            values = values.len(),
            "Region payload has mismatched labels/values lengths, truncating"
        );
    }

    labels
        .iter()
        .zip(values)
        .map(|(label, value)| RawSeriesPoint::new(label.clone(), *value))
        .collect()
}

/// Round to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
