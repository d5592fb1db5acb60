use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Financing ───────────────────────────────────────────────────────────────

/// Loan terms attached to a purchase. When a request carries none, the
/// whole effective cost is paid up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancingTerms {
    /// Amount borrowed. Derived from the down payment when omitted.
    #[serde(default)]
    pub principal: Option<f64>,
    pub annual_rate_pct: f64,
    pub term_months: u32,
    /// Cash paid up front. Defaults to 20% of the effective cost.
    #[serde(default)]
    pub down_payment: Option<f64>,
}

// ─── ROI simulation ──────────────────────────────────────────────────────────

/// Parameters of a multi-year ROI simulation. Money values are in the
/// caller's currency; rates marked `_pct` are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RoiParams {
    pub system_cost: f64,
    pub system_size: f64,
    /// Year-1 production (kWh)
    pub annual_production: f64,
    pub electricity_rate: f64,
    pub rate_inflation_pct: f64,
    pub panel_degradation_pct: f64,
    /// Annual maintenance spend
    pub maintenance_cost: f64,
    pub net_metering: bool,
    /// Feed-in tariff per exported kWh
    pub net_metering_rate: f64,
    /// Fraction (0-1) of production consumed on site
    pub self_consumption_ratio: f64,
    pub subsidy_amount: f64,
    pub financing: Option<FinancingTerms>,
    /// Annual tax savings
    pub tax_benefit: f64,
    pub years: u32,
    pub discount_rate: f64,
    pub co2_factor_kg_per_kwh: f64,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            system_cost: 350_000.0,
            system_size: 5.0,
            annual_production: 7_000.0,
            electricity_rate: 8.0,
            rate_inflation_pct: 3.0,
            panel_degradation_pct: 0.5,
            maintenance_cost: 5_000.0,
            net_metering: true,
            net_metering_rate: 2.5,
            self_consumption_ratio: 0.7,
            subsidy_amount: 0.0,
            financing: None,
            tax_benefit: 0.0,
            years: 25,
            discount_rate: 0.10,
            co2_factor_kg_per_kwh: 0.82,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBucket {
    pub year: u32,
    pub production_kwh: f64,
    /// Net of maintenance and loan payments
    pub net_savings: f64,
    pub cumulative_savings: f64,
    pub electricity_rate: f64,
    /// Remaining output capability after degradation (%)
    pub efficiency_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancingSummary {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub monthly_emi: f64,
    pub total_loan_cost: f64,
    pub total_interest: f64,
    pub term_months: u32,
}

/// Result of the IRR root search. `converged` is false when the iteration
/// cap was hit and `rate` is the last estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IrrEstimate {
    pub rate: f64,
    pub iterations: u32,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub system_cost: f64,
    pub effective_cost: f64,
    pub subsidy_amount: f64,
    /// 1-based month where cumulative cash flow first turns non-negative
    pub break_even_month: Option<u32>,
    pub break_even_year: Option<f64>,
    /// Cumulative net cash flow at the end of the horizon
    pub lifetime_savings: f64,
    /// Gross savings from self-consumption and export
    pub total_savings: f64,
    pub npv: f64,
    pub irr_pct: f64,
    pub irr_converged: bool,
    pub roi_pct: f64,
    pub co2_offset_tons: f64,
    pub trees_equivalent: u64,
    pub financing: Option<FinancingSummary>,
    pub yearly_data: Vec<YearlyBucket>,
}

// ─── Loan comparison ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanOffer {
    pub provider: String,
    pub annual_rate_pct: f64,
    pub term_months: u32,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Percentage of principal charged once
    #[serde(default)]
    pub processing_fee_pct: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparisonRequest {
    pub offers: Vec<LoanOffer>,
    #[serde(default)]
    pub loan_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub provider: String,
    pub principal: f64,
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub processing_fee: f64,
    pub effective_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyEstimate {
    pub system_size_kw: f64,
    pub estimated_subsidy: f64,
}
