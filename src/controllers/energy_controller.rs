use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDateTime;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::controllers::local_now;
use crate::error::EngineError;
use crate::models::energy::{EnergyChartRequest, EnergyChartResponse, EngineInput, TodayEstimate};
use crate::services::engine::{EngineSettings, SiteModel};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayRequest {
    #[serde(flatten)]
    pub input: EngineInput,
    /// Evaluation instant; the server clock when omitted
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
}

/// POST /api/energy/chart
/// Production curve for a site
///
/// `daily` returns the hourly curve for today, `weekly` Monday to Sunday,
/// `monthly` every day of the current month and `yearly` twelve monthly buckets.
#[utoipa::path(
    post,
    path = "/api/energy/chart",
    tag = "energy",
    request_body = EnergyChartRequest,
    responses(
        (status = 200, description = "Chart series", body = EnergyChartResponse),
        (status = 422, description = "Invalid site or system parameters")
    )
)]
pub async fn energy_chart(
    State(settings): State<Arc<EngineSettings>>,
    Json(req): Json<EnergyChartRequest>,
) -> Result<Json<EnergyChartResponse>, EngineError> {
    let model = SiteModel::resolve(&req.input, &settings)?;
    let today = req.today.unwrap_or_else(|| local_now().date());
    Ok(Json(model.energy_chart(req.range, today)))
}

/// POST /api/energy/today
/// Production so far today and the full-day estimate
#[utoipa::path(
    post,
    path = "/api/energy/today",
    tag = "energy",
    request_body = TodayRequest,
    responses(
        (status = 200, description = "Today's estimate", body = TodayEstimate),
        (status = 422, description = "Invalid site or system parameters")
    )
)]
pub async fn energy_today(
    State(settings): State<Arc<EngineSettings>>,
    Json(req): Json<TodayRequest>,
) -> Result<Json<TodayEstimate>, EngineError> {
    let model = SiteModel::resolve(&req.input, &settings)?;
    let now = req.now.unwrap_or_else(local_now);
    Ok(Json(model.simulator.today_estimate(now)))
}
