//! Long-horizon savings and environmental projections.
//!
//! Both series use the same simplified annual yield,
//! `capacity · avgPSH · 365 · 0.85 · degradation(year)`, so their year-N
//! production figures always agree.

use crate::error::Result;
use crate::models::dashboard::{EnvironmentalImpact, ImpactYear, SavingsProjection, SavingsYear};
use crate::models::site::{RegionFactors, SiteLocation, validate_capacity};
use crate::services::solar_geometry::average_peak_sun_hours;
use crate::services::{MILES_PER_TON_CO2, TREES_PER_TON_CO2, degradation_factor, round_dp, validate_horizon};

pub const DEFAULT_PROJECTION_YEARS: u32 = 25;
/// Flat derate for inverter, wiring and temperature losses
pub const PROJECTION_DERATE: f64 = 0.85;
pub const DEFAULT_DEGRADATION_PCT: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Projection {
    pub location: SiteLocation,
    pub capacity_kw: f64,
    pub years: u32,
    pub degradation_pct: f64,
    pub region: RegionFactors,
}

impl Projection {
    pub fn new(location: SiteLocation, capacity_kw: f64, region: RegionFactors) -> Result<Self> {
        validate_capacity(capacity_kw)?;
        Ok(Self {
            location,
            capacity_kw,
            years: DEFAULT_PROJECTION_YEARS,
            degradation_pct: DEFAULT_DEGRADATION_PCT,
            region,
        })
    }

    pub fn with_years(mut self, years: u32) -> Result<Self> {
        validate_horizon(years)?;
        self.years = years;
        Ok(self)
    }

    /// Year-1 production before any degradation (kWh).
    pub fn base_annual_production(&self) -> f64 {
        self.capacity_kw * average_peak_sun_hours(self.location.latitude()) * 365.0 * PROJECTION_DERATE
    }

    /// Production of 1-based `year`.
    pub fn annual_production(&self, year: u32) -> f64 {
        self.base_annual_production() * degradation_factor(self.degradation_pct, f64::from(year.saturating_sub(1)))
    }

    pub fn savings(&self) -> SavingsProjection {
        let rate = self.region.electricity_rate;
        let mut cumulative = 0.0;
        let cumulative_savings = (1..=self.years)
            .map(|year| {
                let annual = self.annual_production(year) * rate;
                cumulative += annual;
                SavingsYear { year, annual: annual.round(), cumulative: cumulative.round() }
            })
            .collect();

        SavingsProjection {
            monthly_savings: (self.base_annual_production() / 12.0 * rate).round(),
            currency_code: self.region.currency_code.clone(),
            electricity_rate: rate,
            cumulative_savings,
        }
    }

    pub fn environmental_impact(&self) -> EnvironmentalImpact {
        let factor = self.region.co2_factor_kg_per_kwh;
        let mut total_co2 = 0.0;
        let yearly_data = (1..=self.years)
            .map(|year| {
                let production = self.annual_production(year);
                let co2 = production * factor / 1000.0;
                total_co2 += co2;
                ImpactYear {
                    year,
                    production_kwh: production.round(),
                    co2_offset_tons: round_dp(co2, 2),
                    trees_equivalent: (co2 * TREES_PER_TON_CO2).round() as u64,
                }
            })
            .collect();

        EnvironmentalImpact {
            total_co2_offset_tons: round_dp(total_co2, 2),
            total_trees_equivalent: (total_co2 * TREES_PER_TON_CO2).round() as u64,
            total_miles_not_driven: (total_co2 * MILES_PER_TON_CO2).round() as u64,
            co2_factor_kg_per_kwh: factor,
            country_label: self.region.country_label.clone(),
            yearly_data,
        }
    }
}

pub fn savings_projection(location: SiteLocation, capacity_kw: f64, region: RegionFactors, years: u32) -> Result<SavingsProjection> {
    Ok(Projection::new(location, capacity_kw, region)?.with_years(years)?.savings())
}

pub fn environmental_impact(location: SiteLocation, capacity_kw: f64, region: RegionFactors, years: u32) -> Result<EnvironmentalImpact> {
    Ok(Projection::new(location, capacity_kw, region)?.with_years(years)?.environmental_impact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::region::resolve_region;

    fn mumbai() -> Projection {
        let loc = SiteLocation::new(19.07, 72.88).unwrap();
        let region = resolve_region(&loc);
        Projection::new(loc, 5.0, region).unwrap()
    }

    #[test]
    fn test_savings_series_is_cumulative() {
        let s = mumbai().savings();
        assert_eq!(s.cumulative_savings.len(), 25);
        assert_eq!(s.currency_code, "INR");
        let mut running = 0.0;
        for (prev, next) in s.cumulative_savings.iter().zip(s.cumulative_savings.iter().skip(1)) {
            assert!(next.annual < prev.annual, "degradation must shrink year {}", next.year);
            assert!(next.cumulative > prev.cumulative);
        }
        for y in &s.cumulative_savings {
            running += y.annual;
        }
        let last = s.cumulative_savings.last().unwrap().cumulative;
        // rounding of 25 annual figures can drift by at most half a unit each
        assert!((running - last).abs() <= 13.0, "sum {running} vs cumulative {last}");
    }

    #[test]
    fn test_first_year_is_undegraded() {
        let p = mumbai();
        assert_eq!(p.annual_production(1), p.base_annual_production());
        assert!((p.annual_production(2) - p.base_annual_production() * 0.995).abs() < 1e-9);
    }

    #[test]
    fn test_environmental_totals_consistent() {
        let impact = mumbai().environmental_impact();
        assert_eq!(impact.yearly_data.len(), 25);
        assert_eq!(impact.co2_factor_kg_per_kwh, 0.82);
        let expected_trees = (impact.total_co2_offset_tons * TREES_PER_TON_CO2).round();
        assert!((impact.total_trees_equivalent as f64 - expected_trees).abs() <= 1.0);
        assert!(impact.total_miles_not_driven > impact.total_trees_equivalent);
    }

    #[test]
    fn test_series_share_production() {
        let p = mumbai();
        let savings = p.savings();
        let impact = p.environmental_impact();
        let rate = p.region.electricity_rate;
        for (s, e) in savings.cumulative_savings.iter().zip(&impact.yearly_data) {
            assert!((s.annual - e.production_kwh * rate).abs() <= rate, "year {}", s.year);
        }
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let loc = SiteLocation::new(10.0, 10.0).unwrap();
        assert!(savings_projection(loc, 0.0, resolve_region(&loc), 25).is_err());
    }

    #[test]
    fn test_horizon_bounds() {
        use crate::services::MAX_HORIZON_YEARS;

        assert_eq!(mumbai().with_years(MAX_HORIZON_YEARS).unwrap().savings().cumulative_savings.len(), 100);
        assert!(mumbai().with_years(0).is_err());
        assert!(mumbai().with_years(MAX_HORIZON_YEARS + 1).is_err());
        let loc = SiteLocation::new(19.07, 72.88).unwrap();
        assert!(environmental_impact(loc, 5.0, resolve_region(&loc), 100_000_000).is_err());
    }
}
