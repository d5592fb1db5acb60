use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::error::EngineError;
use crate::models::energy::EngineInput;
use crate::models::finance::{
    LoanComparison, LoanComparisonRequest, RoiParams, RoiResult, SubsidyEstimate,
};
use crate::services::engine::{EngineSettings, SiteModel};
use crate::services::finance::{calculate_roi, compare_loans, estimate_subsidy};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyQuery {
    /// Array size in kW
    pub system_size_kw: f64,
}

/// POST /api/financing/roi-simulation
/// Multi-year ROI simulation
///
/// Monthly cash-flow model with tariff inflation, panel degradation,
/// net metering and optional loan financing. Omitted fields take defaults.
#[utoipa::path(
    post,
    path = "/api/financing/roi-simulation",
    tag = "financing",
    request_body = RoiParams,
    responses(
        (status = 200, description = "ROI result", body = RoiResult),
        (status = 422, description = "Invalid financial parameters")
    )
)]
pub async fn roi_simulation(Json(params): Json<RoiParams>) -> Result<Json<RoiResult>, EngineError> {
    let result = calculate_roi(&params)?;
    info!(
        system_cost = params.system_cost,
        break_even_month = ?result.break_even_month,
        irr_pct = result.irr_pct,
        "roi simulation"
    );
    Ok(Json(result))
}

/// POST /api/financing/site-roi
/// ROI for a site, priced from its simulated production and regional tariff
#[utoipa::path(
    post,
    path = "/api/financing/site-roi",
    tag = "financing",
    request_body = EngineInput,
    responses(
        (status = 200, description = "ROI result", body = RoiResult),
        (status = 422, description = "Invalid site or financing parameters")
    )
)]
pub async fn site_roi(
    State(settings): State<Arc<EngineSettings>>,
    Json(input): Json<EngineInput>,
) -> Result<Json<RoiResult>, EngineError> {
    let model = SiteModel::resolve(&input, &settings)?;
    Ok(Json(calculate_roi(&model.roi_params(&settings))?))
}

/// POST /api/financing/compare
/// Compare up to four loan offers for the same purchase
#[utoipa::path(
    post,
    path = "/api/financing/compare",
    tag = "financing",
    request_body = LoanComparisonRequest,
    responses(
        (status = 200, description = "One row per offer", body = Vec<LoanComparison>),
        (status = 422, description = "No offers, too many offers or a zero-month term")
    )
)]
pub async fn compare(Json(req): Json<LoanComparisonRequest>) -> Result<Json<Vec<LoanComparison>>, EngineError> {
    Ok(Json(compare_loans(&req.offers, req.loan_amount)?))
}

/// GET /api/financing/subsidy
/// Estimated capacity subsidy for a residential array
#[utoipa::path(
    get,
    path = "/api/financing/subsidy",
    tag = "financing",
    params(SubsidyQuery),
    responses(
        (status = 200, description = "Subsidy estimate", body = SubsidyEstimate)
    )
)]
pub async fn subsidy(Query(q): Query<SubsidyQuery>) -> Json<SubsidyEstimate> {
    Json(estimate_subsidy(q.system_size_kw))
}
