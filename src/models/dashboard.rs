use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::energy::{DailyPoint, EnergySplit, HourlyPoint, ProductionPoint};
use crate::models::site::RegionFactors;
use crate::services::production::EstimateSource;
use crate::services::soiling::Urgency;

// ─── Stored records the dashboard reads from ─────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Latest non-draft design. Loss figures are stored as percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignRecord {
    pub name: Option<String>,
    pub location: Option<Coordinates>,
    pub total_capacity_kw: Option<f64>,
    pub panel_count: Option<u32>,
    pub panel_wattage_w: Option<f64>,
    pub panel_model: Option<String>,
    pub tilt_deg: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub system_losses_pct: Option<f64>,
    pub annual_shadow_loss_pct: Option<f64>,
    /// Design-time estimate for clean, new panels (kWh/yr)
    pub estimated_annual_production_kwh: Option<f64>,
    /// Twelve monthly PSH values from an irradiance survey
    pub monthly_psh: Option<Vec<f64>>,
    pub system_cost: Option<f64>,
    pub annual_savings: Option<f64>,
    pub lifetime_savings: Option<f64>,
    pub break_even_years: Option<f64>,
    pub co2_offset_tons: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveSystemRecord {
    pub capacity_kw: Option<f64>,
    pub panel_count: Option<u32>,
    pub panel_model: Option<String>,
    pub installed_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyRecord {
    pub city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub roof_angle_deg: Option<f64>,
    pub monthly_consumption_kwh: Option<f64>,
}

/// Everything the caller knows about a user's installation. Any part may be
/// missing; the aggregator fills gaps from defaults.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardRequest {
    pub design: Option<DesignRecord>,
    pub active_system: Option<ActiveSystemRecord>,
    pub property: Option<PropertyRecord>,
    /// Location passed explicitly with the request
    pub query: Option<Coordinates>,
    pub last_cleaning: Option<NaiveDateTime>,
    pub region_override: Option<RegionFactors>,
    /// Evaluation instant; the server clock when omitted
    pub now: Option<NaiveDateTime>,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBlock {
    pub today_so_far: f64,
    pub today_estimate: f64,
    pub current_psh: f64,
    pub monthly_total: f64,
    pub yearly_total: f64,
    pub daily_avg: f64,
    pub capacity_kw: f64,
    pub estimate_source: EstimateSource,
    pub monthly_breakdown: Vec<ProductionPoint>,
    pub weekly_data: Vec<DailyPoint>,
    pub hourly_today: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBlock {
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub lifetime_savings: f64,
    pub system_cost: f64,
    pub break_even_years: f64,
    pub break_even_progress_pct: f64,
    pub electricity_rate: f64,
    pub currency_code: String,
    pub country_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub efficiency_pct: f64,
    pub dust_level: Urgency,
    pub days_since_clean: u32,
    pub next_cleaning_date: NaiveDate,
    pub panel_count: u32,
    pub panel_wattage_w: f64,
    pub panel_model: String,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub soiling_loss_pct: f64,
    pub shadow_loss_pct: f64,
    pub degradation_pct: f64,
    pub system_losses_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalBlock {
    pub co2_offset_tons: f64,
    pub co2_per_year_tons: f64,
    pub trees_equivalent: u64,
    pub miles_not_driven: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBlock {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub country_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub energy: EnergyBlock,
    pub financial: FinancialBlock,
    pub distribution: EnergySplit,
    pub system_health: SystemHealth,
    pub environmental: EnvironmentalBlock,
    pub location: LocationBlock,
    /// "design", "system" or "default"
    pub data_source: String,
    /// Field name → name of the source that supplied it
    pub provenance: BTreeMap<String, String>,
}

// ─── Long-horizon projections ────────────────────────────────────────────────

/// Site and horizon for the 25-year projections.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity_kw: Option<f64>,
    pub years: Option<u32>,
    pub region_override: Option<RegionFactors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavingsYear {
    pub year: u32,
    pub annual: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavingsProjection {
    pub monthly_savings: f64,
    pub currency_code: String,
    pub electricity_rate: f64,
    pub cumulative_savings: Vec<SavingsYear>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactYear {
    pub year: u32,
    pub production_kwh: f64,
    pub co2_offset_tons: f64,
    pub trees_equivalent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    pub total_co2_offset_tons: f64,
    pub total_trees_equivalent: u64,
    pub total_miles_not_driven: u64,
    pub co2_factor_kg_per_kwh: f64,
    pub country_label: String,
    pub yearly_data: Vec<ImpactYear>,
}
