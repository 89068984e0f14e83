//! View snapshot endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::views::{SummaryView, TrendView};
use crate::AppState;

/// GET /api/views/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryView> {
    Json(SummaryView::clone(&state.summary.snapshot()))
}

/// GET /api/views/trend
pub async fn get_trend(State(state): State<AppState>) -> Json<TrendView> {
    Json(TrendView::clone(&state.trend.snapshot()))
}

pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/api/views/summary", get(get_summary))
        .route("/api/views/trend", get(get_trend))
}
