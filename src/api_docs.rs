use utoipa::OpenApi;

use crate::controllers::{
    dashboard_controller, energy_controller, finance_controller, maintenance_controller, site_controller,
};
use crate::models::{dashboard, energy, finance, site};
use crate::services::{production, soiling};

#[derive(OpenApi)]
#[openapi(
    paths(
        site_controller::health,
        site_controller::get_region,
        energy_controller::energy_chart,
        energy_controller::energy_today,
        finance_controller::roi_simulation,
        finance_controller::site_roi,
        finance_controller::compare,
        finance_controller::subsidy,
        maintenance_controller::cleaning_schedule,
        dashboard_controller::summary,
        dashboard_controller::savings,
        dashboard_controller::environmental_impact
    ),
    components(
        schemas(
            site_controller::HealthResponse,
            site::RegionFactors,
            energy::EngineInput,
            energy::ChartRange,
            energy::EnergyChartRequest,
            energy::EnergyChartResponse,
            energy::TodayEstimate,
            energy_controller::TodayRequest,
            finance::FinancingTerms,
            finance::RoiParams,
            finance::RoiResult,
            finance::LoanOffer,
            finance::LoanComparisonRequest,
            finance::LoanComparison,
            finance::SubsidyEstimate,
            maintenance_controller::CleaningScheduleRequest,
            soiling::CleaningSchedule,
            soiling::Urgency,
            production::EstimateSource,
            dashboard::DashboardRequest,
            dashboard::DashboardSnapshot,
            dashboard::ProjectionRequest,
            dashboard::SavingsProjection,
            dashboard::EnvironmentalImpact
        )
    ),
    tags(
        (name = "site", description = "Health and regional lookup"),
        (name = "energy", description = "Production curves"),
        (name = "financing", description = "ROI, loans and subsidies"),
        (name = "maintenance", description = "Soiling and cleaning advice"),
        (name = "dashboard", description = "Aggregated dashboard and long-horizon projections")
    )
)]
pub struct ApiDoc;
