use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EngineError, Result};

// ─── Location ────────────────────────────────────────────────────────────────

/// Geographic position in decimal degrees. Only built through [`SiteLocation::new`],
/// so every instance in the engine satisfies |lat| ≤ 90 and |lng| ≤ 180.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteLocation {
    latitude: f64,
    longitude: f64,
}

impl SiteLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(EngineError::InvalidCoordinate { axis: "latitude", value: latitude, limit: 90.0 });
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(EngineError::InvalidCoordinate { axis: "longitude", value: longitude, limit: 180.0 });
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

// ─── Physical system ─────────────────────────────────────────────────────────

/// Physical configuration of an installed (or designed) array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// Peak DC capacity (kW)
    pub capacity_kw: f64,
    pub panel_count: u32,
    /// Nameplate rating of a single panel (W)
    pub panel_wattage_w: f64,
    pub tilt_deg: f64,
    /// Panel azimuth, 180 = due south
    pub azimuth_deg: f64,
    /// Wiring, inverter and mismatch losses as a fraction in [0, 1)
    pub system_loss_fraction: f64,
    /// Annual shading loss as a fraction in [0, 1)
    pub shadow_loss_fraction: f64,
    pub installed_date: Option<NaiveDate>,
}

impl SystemConfig {
    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.capacity_kw)?;
        validate_loss_fraction("systemLossFraction", self.system_loss_fraction)?;
        validate_loss_fraction("shadowLossFraction", self.shadow_loss_fraction)?;
        Ok(())
    }

    /// Fractional years since installation, or `None` for an unknown install date.
    pub fn years_active(&self, today: NaiveDate) -> Option<f64> {
        self.installed_date
            .map(|d| ((today - d).num_days() as f64 / 365.25).max(0.0))
    }
}

pub fn validate_capacity(capacity_kw: f64) -> Result<()> {
    if !capacity_kw.is_finite() || capacity_kw <= 0.0 {
        return Err(EngineError::InvalidCapacity(capacity_kw));
    }
    Ok(())
}

pub fn validate_loss_fraction(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(EngineError::InvalidLossFraction { name, value });
    }
    Ok(())
}

// ─── Soiling ─────────────────────────────────────────────────────────────────

/// Days elapsed since the panels were last cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoilingState {
    pub days_since_clean: u32,
}

impl SoilingState {
    pub fn new(days_since_clean: u32) -> Self {
        Self { days_since_clean }
    }

    /// Derive the state from the most recent cleaning event. A cleaning logged
    /// in the future counts as "just cleaned".
    pub fn from_last_cleaning(
        last_cleaning: Option<NaiveDateTime>,
        now: NaiveDateTime,
        default_days: u32,
    ) -> Self {
        let days = match last_cleaning {
            Some(at) => (now - at).num_days().clamp(0, i64::from(u32::MAX)) as u32,
            None => default_days,
        };
        Self::new(days)
    }

    pub fn cleaned() -> Self {
        Self::new(0)
    }
}

// ─── Region ──────────────────────────────────────────────────────────────────

/// Tariff and grid characteristics for the region a site falls in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionFactors {
    /// Retail electricity price per kWh, in `currency_code`
    pub electricity_rate: f64,
    pub currency_code: String,
    /// Grid emission factor (kg CO₂ per kWh)
    pub co2_factor_kg_per_kwh: f64,
    pub country_label: String,
    /// Typical turnkey installation cost per kW, in `currency_code`
    pub install_cost_per_kw: f64,
}

impl RegionFactors {
    /// Caller-supplied factors must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("electricityRate", self.electricity_rate),
            ("co2FactorKgPerKwh", self.co2_factor_kg_per_kwh),
            ("installCostPerKw", self.install_cost_per_kw),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidParameter { name, reason: format!("{value} must be finite and >= 0") });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_location_bounds() {
        assert!(SiteLocation::new(90.0, -180.0).is_ok());
        assert!(SiteLocation::new(90.1, 0.0).is_err());
        assert!(SiteLocation::new(0.0, 180.5).is_err());
        assert!(SiteLocation::new(f64::NAN, 0.0).is_err());
        assert!(SiteLocation::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_loss_fraction_rejects_one_and_negative() {
        assert!(validate_loss_fraction("x", 0.0).is_ok());
        assert!(validate_loss_fraction("x", 0.99).is_ok());
        assert!(validate_loss_fraction("x", 1.0).is_err());
        assert!(validate_loss_fraction("x", -0.01).is_err());
    }

    #[test]
    fn test_system_config_age_and_validation() {
        let mut system = SystemConfig {
            capacity_kw: 5.0,
            panel_count: 13,
            panel_wattage_w: 385.0,
            tilt_deg: 25.0,
            azimuth_deg: 180.0,
            system_loss_fraction: 0.15,
            shadow_loss_fraction: 0.0,
            installed_date: NaiveDate::from_ymd_opt(2023, 4, 16),
        };
        let today = NaiveDate::from_ymd_opt(2025, 4, 16).unwrap();
        assert!(system.validate().is_ok());
        let years = system.years_active(today).unwrap();
        assert!((years - 2.0).abs() < 0.01, "years active {years}");

        system.installed_date = None;
        assert_eq!(system.years_active(today), None);
        system.shadow_loss_fraction = 1.0;
        assert!(system.validate().is_err());
    }

    #[test]
    fn test_soiling_from_last_cleaning() {
        let now = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(SoilingState::from_last_cleaning(Some(last), now, 30).days_since_clean, 30);
        assert_eq!(SoilingState::from_last_cleaning(None, now, 30).days_since_clean, 30);
        // cleaning logged after "now"
        let future = now + chrono::Duration::days(2);
        assert_eq!(SoilingState::from_last_cleaning(Some(future), now, 30).days_since_clean, 0);
    }
}
