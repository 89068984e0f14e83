//! HTTP API handlers for hw-dash

pub mod health;
pub mod sse;
pub mod views;
pub mod year;

pub use health::health_routes;
pub use sse::{event_routes, event_stream};
pub use views::view_routes;
pub use year::year_routes;
