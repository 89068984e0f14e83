//! KPI API resources and their fetch status

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One remote resource the dashboard reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    /// `{ happiness?, gdp?, social? }` for one year
    SummaryKpis,
    /// `{ labels: [..], values: [..] }` per sub-region for one year
    HappinessByRegion,
    /// Per-country records for the choropleth, passed through untouched
    MapData,
    /// `[{ year, score }]` over all years; fetched once
    GlobalEvolution,
    /// `[{ x, y }]` GDP vs happiness for one year
    CorrelationData,
}

impl Resource {
    /// Resources re-fetched whenever the selected year changes
    pub const YEAR_SCOPED: [Resource; 4] = [
        Resource::SummaryKpis,
        Resource::HappinessByRegion,
        Resource::MapData,
        Resource::CorrelationData,
    ];

    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Resource::SummaryKpis => "/kpis/summary",
            Resource::HappinessByRegion => "/kpis/happiness-by-region",
            Resource::MapData => "/kpis/map-data",
            Resource::GlobalEvolution => "/kpis/global-evolution",
            Resource::CorrelationData => "/kpis/correlation-data",
        }
    }

    /// Whether requests carry a `year` query parameter
    pub fn is_year_scoped(&self) -> bool {
        !matches!(self, Resource::GlobalEvolution)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::SummaryKpis => "summary-kpis",
            Resource::HappinessByRegion => "happiness-by-region",
            Resource::MapData => "map-data",
            Resource::GlobalEvolution => "global-evolution",
            Resource::CorrelationData => "correlation-data",
        }
    }

    pub fn all_variants() -> &'static [Resource] {
        &[
            Resource::SummaryKpis,
            Resource::HappinessByRegion,
            Resource::MapData,
            Resource::GlobalEvolution,
            Resource::CorrelationData,
        ]
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::all_variants()
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("Unknown resource: {}", s)))
    }
}

/// Per-resource lifecycle: `idle → loading → {ready | unavailable}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Never requested
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// Latest request succeeded
    Ready,
    /// Latest request failed or timed out
    Unavailable,
}
