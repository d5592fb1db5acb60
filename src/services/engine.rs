//! Resolution of a partial [`EngineInput`] into a validated site model.
//!
//! Every optional input falls back to [`EngineDefaults`]; validation happens
//! once here so the simulators downstream only ever see sane values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EngineError, Result};
use crate::models::energy::{ChartData, ChartRange, EnergyChartResponse, EngineInput};
use crate::models::finance::{FinancingTerms, RoiParams};
use crate::models::site::{RegionFactors, SiteLocation, SoilingState, validate_capacity};
use crate::services::production::{DEFAULT_OVERLAP_FACTOR, LossProfile, ProductionSimulator, SanityBand};
use crate::services::region::resolve_with_override;
use crate::services::soiling::SoilingModel;
use crate::services::degradation_factor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EngineDefaults {
    pub reference_latitude: f64,
    pub reference_longitude: f64,
    pub capacity_kw: f64,
    pub system_loss_fraction: f64,
    pub days_since_clean: u32,
    /// Assumed age of a system with no install date
    pub years_active: f64,
    pub panel_degradation_pct: f64,
    /// Nameplate of one panel when only the array size is known
    pub panel_kw: f64,
    pub panel_wattage_w: f64,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            reference_latitude: 28.6139,
            reference_longitude: 77.2090,
            capacity_kw: 5.0,
            system_loss_fraction: 0.15,
            days_since_clean: 30,
            years_active: 0.5,
            panel_degradation_pct: 0.5,
            panel_kw: 0.4,
            panel_wattage_w: 400.0,
        }
    }
}

/// Everything the engine needs beyond the request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub defaults: EngineDefaults,
    pub soiling: SoilingModel,
    pub sanity_band: SanityBand,
    pub overlap_factor: f64,
    pub discount_rate: f64,
    pub horizon_years: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            defaults: EngineDefaults::default(),
            soiling: SoilingModel::default(),
            sanity_band: SanityBand::default(),
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
            discount_rate: 0.10,
            horizon_years: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteModel {
    pub location: SiteLocation,
    pub region: RegionFactors,
    /// Nameplate capacity before degradation
    pub capacity_kw: f64,
    pub losses: LossProfile,
    pub degradation: f64,
    pub soiling: SoilingState,
    pub financing: Option<FinancingTerms>,
    pub simulator: ProductionSimulator,
}

impl SiteModel {
    pub fn resolve(input: &EngineInput, settings: &EngineSettings) -> Result<Self> {
        let defaults = &settings.defaults;
        let location = SiteLocation::new(
            input.latitude.unwrap_or(defaults.reference_latitude),
            input.longitude.unwrap_or(defaults.reference_longitude),
        )?;

        let capacity_kw = input.capacity_kw.unwrap_or(defaults.capacity_kw);
        validate_capacity(capacity_kw)?;

        let years = input.degradation_elapsed_years.unwrap_or(0.0);
        if !years.is_finite() || years < 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "degradationElapsedYears",
                reason: format!("{years} must be finite and >= 0"),
            });
        }
        let degradation = degradation_factor(defaults.panel_degradation_pct, years);

        let soiling = SoilingState::new(input.days_since_clean.unwrap_or(defaults.days_since_clean));
        let losses = LossProfile::new(
            input.system_loss_fraction.unwrap_or(defaults.system_loss_fraction),
            input.shadow_loss_fraction.unwrap_or(0.0),
            settings.soiling.loss_fraction(soiling),
        )?;

        let simulator = ProductionSimulator::new(location.latitude(), capacity_kw * degradation, losses.total_fraction())?;

        Ok(Self {
            region: resolve_with_override(&location, input.region_override.as_ref())?,
            location,
            capacity_kw,
            losses,
            degradation,
            soiling,
            financing: input.financing_terms.clone(),
            simulator,
        })
    }

    pub fn energy_chart(&self, range: ChartRange, today: NaiveDate) -> EnergyChartResponse {
        let rate = self.region.electricity_rate;
        let chart_data = match range {
            ChartRange::Daily => ChartData::Hourly(self.simulator.today_hourly_curve(today)),
            ChartRange::Weekly => ChartData::Daily(self.simulator.weekly_production_data(today, rate)),
            ChartRange::Monthly => ChartData::Daily(self.simulator.month_daily_production(today, rate)),
            ChartRange::Yearly => ChartData::Monthly(self.simulator.yearly_production_breakdown()),
        };
        EnergyChartResponse { range, chart_data }
    }

    /// ROI parameters for this site: simulated year-1 production priced at the
    /// regional tariff, with a turnkey cost from the regional cost per kW.
    pub fn roi_params(&self, settings: &EngineSettings) -> RoiParams {
        RoiParams {
            system_cost: (self.capacity_kw * self.region.install_cost_per_kw).round(),
            system_size: self.capacity_kw,
            annual_production: self.simulator.yearly_total(),
            electricity_rate: self.region.electricity_rate,
            panel_degradation_pct: settings.defaults.panel_degradation_pct,
            financing: self.financing.clone(),
            years: settings.horizon_years,
            discount_rate: settings.discount_rate,
            co2_factor_kg_per_kwh: self.region.co2_factor_kg_per_kwh,
            ..RoiParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::finance::calculate_roi;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()
    }

    #[test]
    fn test_empty_input_uses_reference_site() {
        let model = SiteModel::resolve(&EngineInput::default(), &EngineSettings::default()).unwrap();
        assert_eq!(model.location.latitude(), 28.6139);
        assert_eq!(model.capacity_kw, 5.0);
        assert_eq!(model.soiling.days_since_clean, 30);
        assert_eq!(model.degradation, 1.0);
        assert!(model.losses.total_fraction() > 0.15);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let settings = EngineSettings::default();
        let bad_lat = EngineInput { latitude: Some(91.0), ..EngineInput::default() };
        assert!(matches!(
            SiteModel::resolve(&bad_lat, &settings),
            Err(EngineError::InvalidCoordinate { .. })
        ));
        let bad_cap = EngineInput { capacity_kw: Some(-2.0), ..EngineInput::default() };
        assert!(matches!(SiteModel::resolve(&bad_cap, &settings), Err(EngineError::InvalidCapacity(_))));
        let bad_loss = EngineInput { system_loss_fraction: Some(1.0), ..EngineInput::default() };
        assert!(matches!(
            SiteModel::resolve(&bad_loss, &settings),
            Err(EngineError::InvalidLossFraction { .. })
        ));
    }

    #[test]
    fn test_chart_ranges() {
        let model = SiteModel::resolve(&EngineInput::default(), &EngineSettings::default()).unwrap();
        match model.energy_chart(ChartRange::Weekly, today()).chart_data {
            ChartData::Daily(days) => assert_eq!(days.len(), 7),
            other => panic!("unexpected weekly data {other:?}"),
        }
        match model.energy_chart(ChartRange::Monthly, today()).chart_data {
            ChartData::Daily(days) => assert_eq!(days.len(), 30),
            other => panic!("unexpected monthly data {other:?}"),
        }
        match model.energy_chart(ChartRange::Yearly, today()).chart_data {
            ChartData::Monthly(months) => assert_eq!(months.len(), 12),
            other => panic!("unexpected yearly data {other:?}"),
        }
        assert!(matches!(model.energy_chart(ChartRange::Daily, today()).chart_data, ChartData::Hourly(_)));
    }

    #[test]
    fn test_region_override_reaches_model() {
        let custom = RegionFactors {
            electricity_rate: 0.25,
            currency_code: "GBP".to_owned(),
            co2_factor_kg_per_kwh: 0.2,
            country_label: "UK".to_owned(),
            install_cost_per_kw: 1_400.0,
        };
        let input = EngineInput { region_override: Some(custom.clone()), ..EngineInput::default() };
        let model = SiteModel::resolve(&input, &EngineSettings::default()).unwrap();
        assert_eq!(model.region, custom);
    }

    #[test]
    fn test_simulated_year_feeds_roi_year_one() {
        let input = EngineInput {
            latitude: Some(24.86),
            longitude: Some(67.01),
            capacity_kw: Some(6.6),
            ..EngineInput::default()
        };
        let settings = EngineSettings::default();
        let model = SiteModel::resolve(&input, &settings).unwrap();
        let yearly_total = model.simulator.yearly_total();

        let params = model.roi_params(&settings);
        assert_eq!(params.annual_production, yearly_total);
        assert_eq!(params.system_cost, 990_000.0);

        let roi = calculate_roi(&params).unwrap();
        assert_eq!(roi.yearly_data[0].production_kwh, yearly_total.round());
    }
}
