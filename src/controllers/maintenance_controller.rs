use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::controllers::local_now;
use crate::error::EngineError;
use crate::models::energy::EngineInput;
use crate::services::engine::{EngineSettings, SiteModel};
use crate::services::soiling::{CleaningInputs, CleaningSchedule};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningScheduleRequest {
    #[serde(flatten)]
    pub input: EngineInput,
    /// Cost of one cleaning; the configured default when omitted
    #[serde(default)]
    pub cleaning_cost: Option<f64>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// POST /api/maintenance/cleaning-schedule
/// When to clean next, and what waiting costs
#[utoipa::path(
    post,
    path = "/api/maintenance/cleaning-schedule",
    tag = "maintenance",
    request_body = CleaningScheduleRequest,
    responses(
        (status = 200, description = "Cleaning advice", body = CleaningSchedule),
        (status = 422, description = "Invalid site or system parameters")
    )
)]
pub async fn cleaning_schedule(
    State(settings): State<Arc<EngineSettings>>,
    State(config): State<Arc<Config>>,
    Json(req): Json<CleaningScheduleRequest>,
) -> Result<Json<CleaningSchedule>, EngineError> {
    let cleaning_cost = req.cleaning_cost.unwrap_or(config.maintenance.cleaning_cost);
    if !cleaning_cost.is_finite() || cleaning_cost < 0.0 {
        return Err(EngineError::InvalidParameter {
            name: "cleaningCost",
            reason: format!("{cleaning_cost} must be finite and >= 0"),
        });
    }

    let model = SiteModel::resolve(&req.input, &settings)?;
    let today = req.today.unwrap_or_else(|| local_now().date());
    let inputs = CleaningInputs {
        days_since_clean: model.soiling.days_since_clean,
        capacity_kw: model.capacity_kw,
        peak_sun_hours: model.simulator.psh_for(today),
        electricity_rate: model.region.electricity_rate,
        currency_code: model.region.currency_code.clone(),
        cleaning_cost,
        today,
    };
    Ok(Json(settings.soiling.cleaning_schedule(&inputs)))
}
