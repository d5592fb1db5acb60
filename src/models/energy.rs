use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::site::RegionFactors;
use crate::models::finance::FinancingTerms;

// ─── Production curves ───────────────────────────────────────────────────────

/// One bucket of a production curve (month, day, ...).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPoint {
    pub label: String,
    pub produced_kwh: f64,
    pub consumed_kwh: f64,
    /// Always `max(0, produced - consumed)`
    pub exported_kwh: f64,
}

impl ProductionPoint {
    pub fn new(label: impl Into<String>, produced_kwh: f64, consumed_kwh: f64) -> Self {
        Self {
            label: label.into(),
            produced_kwh,
            consumed_kwh,
            exported_kwh: (produced_kwh - consumed_kwh).max(0.0),
        }
    }

    /// Rescale production and consumption, keeping the export invariant.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.label.clone(),
            (self.produced_kwh * factor).round(),
            (self.consumed_kwh * factor).round(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SunTimes {
    /// Decimal clock hours
    pub sunrise: f64,
    pub sunset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayEstimate {
    pub today_so_far: f64,
    pub full_day_estimate: f64,
    pub current_psh: f64,
    pub sunrise: f64,
    pub sunset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    /// "H:00"
    pub hour: String,
    pub production_kw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// Weekday tag ("Mon") or date ("2025-04-03")
    pub day: String,
    pub production_kwh: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoilingLoss {
    pub dust_level_pct: f64,
    pub efficiency_loss_pct: f64,
}

/// Percentage split of the month's energy flows. The three terms always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnergySplit {
    pub self_consumed_pct: u32,
    pub exported_pct: u32,
    pub grid_import_pct: u32,
}

// ─── Engine input contract ───────────────────────────────────────────────────

/// Transport-independent input to the production and chart operations.
/// Every field is optional; missing values fall back to configured defaults.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity_kw: Option<f64>,
    pub system_loss_fraction: Option<f64>,
    pub shadow_loss_fraction: Option<f64>,
    pub degradation_elapsed_years: Option<f64>,
    pub days_since_clean: Option<u32>,
    pub financing_terms: Option<FinancingTerms>,
    pub region_override: Option<RegionFactors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartRange {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnergyChartRequest {
    #[serde(default)]
    pub range: ChartRange,
    #[serde(flatten)]
    pub input: EngineInput,
    /// Reference day for the series; the server's date when omitted
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ChartData {
    Hourly(Vec<HourlyPoint>),
    Daily(Vec<DailyPoint>),
    Monthly(Vec<ProductionPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnergyChartResponse {
    pub range: ChartRange,
    pub chart_data: ChartData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_never_negative() {
        let p = ProductionPoint::new("Jan", 400.0, 520.0);
        assert_eq!(p.exported_kwh, 0.0);
        let p = ProductionPoint::new("Feb", 600.0, 450.0);
        assert_eq!(p.exported_kwh, 150.0);
        let s = p.scaled(0.5);
        assert_eq!(s.exported_kwh, s.produced_kwh - s.consumed_kwh);
    }

    #[test]
    fn test_chart_request_defaults_to_monthly() {
        let req: EnergyChartRequest = serde_json::from_str(r#"{"latitude": 24.9}"#).unwrap();
        assert_eq!(req.range, ChartRange::Monthly);
        assert_eq!(req.input.latitude, Some(24.9));
        assert!(req.input.capacity_kw.is_none());
    }
}
