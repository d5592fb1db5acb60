use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use crate::controllers::local_now;
use crate::error::EngineError;
use crate::models::dashboard::{DashboardRequest, DashboardSnapshot, EnvironmentalImpact, ProjectionRequest, SavingsProjection};
use crate::models::site::SiteLocation;
use crate::services::dashboard::build_snapshot;
use crate::services::engine::EngineSettings;
use crate::services::projection::{DEFAULT_PROJECTION_YEARS, Projection};
use crate::services::region::resolve_with_override;

/// POST /api/dashboard/summary
/// One consistent dashboard snapshot
///
/// Fields are taken from the latest design, then the request location, the
/// property profile and the active system, in that order; `provenance` tells
/// which source supplied each one.
#[utoipa::path(
    post,
    path = "/api/dashboard/summary",
    tag = "dashboard",
    request_body = DashboardRequest,
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot),
        (status = 422, description = "Stored data failed validation")
    )
)]
pub async fn summary(
    State(settings): State<Arc<EngineSettings>>,
    Json(req): Json<DashboardRequest>,
) -> Result<Json<DashboardSnapshot>, EngineError> {
    let now = req.now.unwrap_or_else(local_now);
    let snapshot = build_snapshot(&req, &settings, now)?;
    info!(
        data_source = %snapshot.data_source,
        yearly_kwh = snapshot.energy.yearly_total,
        "dashboard summary"
    );
    Ok(Json(snapshot))
}

fn projection(req: &ProjectionRequest, settings: &EngineSettings) -> Result<Projection, EngineError> {
    let defaults = &settings.defaults;
    let location = SiteLocation::new(
        req.latitude.unwrap_or(defaults.reference_latitude),
        req.longitude.unwrap_or(defaults.reference_longitude),
    )?;
    let region = resolve_with_override(&location, req.region_override.as_ref())?;
    let mut projection = Projection::new(location, req.capacity_kw.unwrap_or(defaults.capacity_kw), region)?
        .with_years(req.years.unwrap_or(DEFAULT_PROJECTION_YEARS))?;
    projection.degradation_pct = defaults.panel_degradation_pct;
    Ok(projection)
}

/// POST /api/dashboard/savings
/// Year-by-year savings over the projection horizon
#[utoipa::path(
    post,
    path = "/api/dashboard/savings",
    tag = "dashboard",
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Savings projection", body = SavingsProjection),
        (status = 422, description = "Invalid site or capacity")
    )
)]
pub async fn savings(
    State(settings): State<Arc<EngineSettings>>,
    Json(req): Json<ProjectionRequest>,
) -> Result<Json<SavingsProjection>, EngineError> {
    Ok(Json(projection(&req, &settings)?.savings()))
}

/// POST /api/dashboard/environmental-impact
/// CO₂ offset, trees and miles equivalents over the projection horizon
#[utoipa::path(
    post,
    path = "/api/dashboard/environmental-impact",
    tag = "dashboard",
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Environmental impact", body = EnvironmentalImpact),
        (status = 422, description = "Invalid site or capacity")
    )
)]
pub async fn environmental_impact(
    State(settings): State<Arc<EngineSettings>>,
    Json(req): Json<ProjectionRequest>,
) -> Result<Json<EnvironmentalImpact>, EngineError> {
    Ok(Json(projection(&req, &settings)?.environmental_impact()))
}
