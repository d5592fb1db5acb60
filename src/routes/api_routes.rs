use axum::{
    Router,
    routing::{get, post},
};

use crate::controllers::{
    dashboard_controller::{environmental_impact, savings, summary},
    energy_controller::{energy_chart, energy_today},
    finance_controller::{compare, roi_simulation, site_roi, subsidy},
    maintenance_controller::cleaning_schedule,
    site_controller::{get_region, health},
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
/// Handlers pull `Arc<EngineSettings>` and/or `Arc<Config>` out of
/// [`AppState`] through `FromRef`.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health",                         get(health))
        .route("/region",                         get(get_region))
        .route("/energy/chart",                   post(energy_chart))
        .route("/energy/today",                   post(energy_today))
        .route("/financing/roi-simulation",       post(roi_simulation))
        .route("/financing/site-roi",             post(site_roi))
        .route("/financing/compare",              post(compare))
        .route("/financing/subsidy",              get(subsidy))
        .route("/maintenance/cleaning-schedule",  post(cleaning_schedule))
        .route("/dashboard/summary",              post(summary))
        .route("/dashboard/savings",              post(savings))
        .route("/dashboard/environmental-impact", post(environmental_impact))
        .with_state(state)
}
