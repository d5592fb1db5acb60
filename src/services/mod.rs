pub mod dashboard;
pub mod engine;
pub mod finance;
pub mod production;
pub mod projection;
pub mod region;
pub mod soiling;
pub mod solar_geometry;

/// Round to `dp` decimal places, half away from zero.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Compounded remaining output capability after `years` of degradation at
/// `annual_pct` percent per year.
pub fn degradation_factor(annual_pct: f64, years: f64) -> f64 {
    (1.0 - annual_pct / 100.0).powf(years.max(0.0))
}

/// Trees needed to absorb one metric ton of CO₂ per year
pub const TREES_PER_TON_CO2: f64 = 45.0;
/// Average passenger-car miles emitting one metric ton of CO₂
pub const MILES_PER_TON_CO2: f64 = 2481.0;

/// Longest simulated horizon, in years
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Horizons run `years × 12` monthly steps, so they are capped.
pub fn validate_horizon(years: u32) -> crate::error::Result<()> {
    if years == 0 || years > MAX_HORIZON_YEARS {
        return Err(crate::error::EngineError::InvalidParameter {
            name: "years",
            reason: format!("{years} is not within [1, {MAX_HORIZON_YEARS}]"),
        });
    }
    Ok(())
}
