/// ============================================================
///  Solar Geometry – peak sun hours & day length
///
///  Algorithm pipeline (per representative day):
///   1. Solar declination  – Cooper (1969)
///   2. Sunset hour angle  – ω = acos(−tan φ · tan δ)
///   3. Extraterrestrial   – eccentricity-corrected solar constant,
///                           daily horizontal irradiation Ho
///   4. Clearness index    – climatological Kt by latitude band
///   5. Tilt gain          – panels tilted at latitude gain in winter
///
///  Everything here is a pure function of latitude and day-of-year.
/// ============================================================

use std::f64::consts::PI;

use crate::models::energy::SunTimes;
use crate::services::round_dp;

// ─── Physical constants ──────────────────────────────────────
const SC: f64 = 1367.0; // Solar constant W/m²
const DEG: f64 = PI / 180.0;

/// Day-of-year of the 15th of each month (non-leap year).
pub const MID_MONTH_DOY: [u32; 12] = [15, 46, 74, 105, 135, 166, 196, 227, 258, 288, 319, 349];

pub const MIN_PSH: f64 = 1.5;
pub const MAX_PSH: f64 = 8.5;

const EARLIEST_SUNRISE_H: f64 = 4.0;
const LATEST_SUNSET_H: f64 = 20.0;

/// Solar declination in radians (Cooper's equation).
pub fn declination(doy: u32) -> f64 {
    23.45 * DEG * (DEG * (360.0 / 365.0) * (doy as f64 + 284.0)).sin()
}

/// Sunset hour angle ω in radians. Polar day/night saturate at π / 0.
pub fn sunset_hour_angle(lat_rad: f64, decl_rad: f64) -> f64 {
    let cos_omega = -lat_rad.tan() * decl_rad.tan();
    cos_omega.clamp(-1.0, 1.0).acos()
}

/// Daily extraterrestrial irradiation on a horizontal plane (kWh/m²).
fn extraterrestrial_daily(lat_rad: f64, decl_rad: f64, omega: f64, doy: u32) -> f64 {
    let g_on = SC * (1.0 + 0.033 * (DEG * 360.0 * doy as f64 / 365.0).cos());
    (24.0 / PI)
        * (g_on / 1000.0)
        * (lat_rad.cos() * decl_rad.cos() * omega.sin() + omega * lat_rad.sin() * decl_rad.sin())
}

/// Empirical clearness index by climate band. Stands in for atmospheric
/// attenuation when no measured weather is available.
pub fn clearness_index(lat_deg: f64) -> f64 {
    let abs_lat = lat_deg.abs();
    if abs_lat < 20.0 {
        0.58 // tropical
    } else if abs_lat < 35.0 {
        0.52 // subtropical / arid belt
    } else if abs_lat < 50.0 {
        0.45 // temperate
    } else {
        0.38 // high latitude
    }
}

/// Peak sun hours on a latitude-tilted surface for one day of the year.
pub fn peak_sun_hours(lat_deg: f64, doy: u32) -> f64 {
    let lat = lat_deg * DEG;
    let decl = declination(doy);
    let omega = sunset_hour_angle(lat, decl);
    let day_length_h = 2.0 * omega / (15.0 * DEG);

    let ho = extraterrestrial_daily(lat, decl, omega, doy).max(0.0);
    let ghi = ho * clearness_index(lat_deg);

    // ~+8 % on short winter days, slight loss on long summer days
    let tilt_gain = 1.0 + 0.08 * (1.0 - day_length_h / 12.0);

    round_dp((ghi * tilt_gain).clamp(MIN_PSH, MAX_PSH), 2)
}

/// PSH for each calendar month, January first.
pub fn monthly_peak_sun_hours(lat_deg: f64) -> [f64; 12] {
    MID_MONTH_DOY.map(|doy| peak_sun_hours(lat_deg, doy))
}

/// Mean of the twelve monthly values.
pub fn average_peak_sun_hours(lat_deg: f64) -> f64 {
    monthly_peak_sun_hours(lat_deg).iter().sum::<f64>() / 12.0
}

/// Sunrise and sunset around a nominal 12:00 solar noon, in decimal hours.
/// Longitude and the equation of time are ignored.
pub fn sunrise_sunset(lat_deg: f64, doy: u32) -> SunTimes {
    let omega = sunset_hour_angle(lat_deg * DEG, declination(doy));
    let half_day_h = omega / DEG / 15.0;

    SunTimes {
        sunrise: round_dp((12.0 - half_day_h).max(EARLIEST_SUNRISE_H), 2),
        sunset: round_dp((12.0 + half_day_h).min(LATEST_SUNSET_H), 2),
    }
}
