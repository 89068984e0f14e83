//! # Happy World Common Library
//!
//! Shared code for the world-happiness dashboard:
//! - Year selection and KPI resource identifiers
//! - Score classification and region aggregation
//! - Chart series types consumed by the rendering layer
//! - Event types (DashboardEvent) and the EventBus
//! - Configuration loading

pub mod chart;
pub mod config;
pub mod error;
pub mod events;
pub mod regions;
pub mod resource;
pub mod scoring;
pub mod year;

pub use error::{Error, Result};
pub use resource::{Resource, ResourceStatus};
pub use scoring::ColorBucket;
pub use year::Year;
