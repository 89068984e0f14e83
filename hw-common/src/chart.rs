//! Chart-ready series handed to the rendering layer
//!
//! The dashboard core produces these; the frontend only draws them.
//! Field names serialize in camelCase so the JSON can be fed to the
//! charting library with minimal reshaping.

use serde::{Deserialize, Serialize};

/// Chart types produced by the view models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Scatter,
    Doughnut,
}

/// A single (x, y) sample for scatter charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Values of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesData {
    /// One value per chart label (line, doughnut)
    Values(Vec<f64>),
    /// Free (x, y) pairs (scatter)
    Points(Vec<ScatterPoint>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(values) => values.len(),
            SeriesData::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Style metadata for a dataset; unset fields use the renderer's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    /// One color per value, or a single color for the whole dataset
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub background_colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    /// Line smoothing (0.0 = straight segments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_offset: Option<u32>,
}

/// One dataset of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: SeriesData,
    #[serde(default)]
    pub style: SeriesStyle,
}

/// Everything the renderer needs for one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Category labels (empty for scatter charts)
    #[serde(default)]
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    /// A chart with no labels and no datasets
    pub fn empty(kind: ChartKind) -> Self {
        Self {
            kind,
            title: None,
            labels: Vec::new(),
            datasets: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// True when no dataset holds any value
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|d| d.data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_chart_serialization() {
        let chart = ChartSeries::empty(ChartKind::Scatter);
        assert!(chart.is_empty());
        assert_eq!(
            serde_json::to_value(&chart).unwrap(),
            json!({"kind": "scatter", "labels": [], "datasets": []})
        );
    }

    #[test]
    fn test_style_skips_unset_fields() {
        let dataset = Dataset {
            label: "Global".to_string(),
            data: SeriesData::Values(vec![5.2, 5.4]),
            style: SeriesStyle {
                border_color: Some("#118AB2".to_string()),
                tension: Some(0.4),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&dataset).unwrap();

        assert_eq!(value["data"], json!([5.2, 5.4]));
        assert_eq!(value["style"], json!({"borderColor": "#118AB2", "tension": 0.4}));
    }

    #[test]
    fn test_scatter_points_serialize_as_objects() {
        let data = SeriesData::Points(vec![ScatterPoint { x: 1.5, y: 6.1 }]);
        assert_eq!(serde_json::to_value(&data).unwrap(), json!([{"x": 1.5, "y": 6.1}]));
        assert_eq!(data.len(), 1);
    }
}
