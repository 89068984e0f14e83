//! Year selection and refresh endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use hw_common::{Resource, Year};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// Current year selection
#[derive(Debug, Serialize)]
pub struct YearResponse {
    pub year: Year,
    /// Years with evolution data, newest first
    pub available_years: Vec<Year>,
    /// True when startup data was missing and the default year is in use
    pub empty_state: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetYearRequest {
    /// Accepted as a plain integer so range errors surface as 400s
    pub year: i32,
}

/// Resources whose fetch was (re)issued by a request
#[derive(Debug, Serialize)]
pub struct RequestedResponse {
    pub requested: Vec<Resource>,
}

#[derive(Debug, Serialize)]
pub struct SetYearResponse {
    #[serde(flatten)]
    pub selection: YearResponse,
    pub requested: Vec<Resource>,
}

fn current_selection(state: &AppState) -> YearResponse {
    YearResponse {
        year: state.coordinator.year(),
        available_years: state.coordinator.available_years(),
        empty_state: state.coordinator.is_empty_state(),
    }
}

/// GET /api/year
pub async fn get_year(State(state): State<AppState>) -> Json<YearResponse> {
    Json(current_selection(&state))
}

/// POST /api/year
///
/// Fetches run in the background; progress arrives over `/api/events`.
pub async fn set_year(
    State(state): State<AppState>,
    Json(request): Json<SetYearRequest>,
) -> ApiResult<Json<SetYearResponse>> {
    info!(year = request.year, "Year selection requested");

    let pending = state.coordinator.set_year(request.year)?;

    Ok(Json(SetYearResponse {
        selection: current_selection(&state),
        requested: pending.resources(),
    }))
}

/// POST /api/refresh
pub async fn refresh(State(state): State<AppState>) -> Json<RequestedResponse> {
    let pending = state.coordinator.refresh();
    Json(RequestedResponse {
        requested: pending.resources(),
    })
}

/// POST /api/refresh/:resource
pub async fn refresh_resource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<RequestedResponse>> {
    let resource: Resource = name.parse()?;
    let pending = state.coordinator.refresh_resource(resource);
    Ok(Json(RequestedResponse {
        requested: pending.resources(),
    }))
}

pub fn year_routes() -> Router<AppState> {
    Router::new()
        .route("/api/year", get(get_year).post(set_year))
        .route("/api/refresh", post(refresh))
        .route("/api/refresh/:resource", post(refresh_resource))
}
