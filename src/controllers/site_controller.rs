use axum::{Json, extract::Query, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::EngineError;
use crate::models::site::{RegionFactors, SiteLocation};
use crate::services::region::resolve_region;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegionQuery {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "site",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// GET /api/region
/// Resolve tariff, currency and grid CO₂ factor for a location
///
/// Regions are matched by bounding box in a fixed order; points outside every
/// box get the "Unknown" fallback.
#[utoipa::path(
    get,
    path = "/api/region",
    tag = "site",
    params(RegionQuery),
    responses(
        (status = 200, description = "Regional factors", body = RegionFactors),
        (status = 422, description = "Coordinates out of range")
    )
)]
pub async fn get_region(Query(q): Query<RegionQuery>) -> Result<Json<RegionFactors>, EngineError> {
    let location = SiteLocation::new(q.lat, q.lng)?;
    Ok(Json(resolve_region(&location)))
}
