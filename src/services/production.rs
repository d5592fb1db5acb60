/// ============================================================
///  Production Simulator
///
///  Composes the PSH table with system, shading and soiling losses
///  (and a degraded capacity supplied by the caller) into energy
///  curves at several granularities:
///
///   • today        – half-hour sine curve between sunrise & sunset
///   • hourly       – the same curve sampled on the hour
///   • weekly/month – daily totals with deterministic weather jitter
///   • yearly       – twelve monthly buckets with a consumption split
///
///  All curves share one model so the "today", "this month" and
///  "this year" figures agree with each other.
/// ============================================================

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::energy::{DailyPoint, EnergySplit, HourlyPoint, ProductionPoint, TodayEstimate};
use crate::models::site::{validate_capacity, validate_loss_fraction};
use crate::services::round_dp;
use crate::services::solar_geometry::{monthly_peak_sun_hours, sunrise_sunset};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// PSH the intensity curve is normalised against.
const REFERENCE_PSH: f64 = 5.0;
const HALF_HOUR: f64 = 0.5;
/// Combined losses never exceed this, whatever the inputs.
pub const MAX_TOTAL_LOSS: f64 = 0.80;

// ─── Losses ──────────────────────────────────────────────────

/// Loss components as fractions in [0, 1). Shading and soiling apply to what
/// is left after system losses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LossProfile {
    pub system: f64,
    pub shadow: f64,
    pub soiling: f64,
}

impl LossProfile {
    pub fn new(system: f64, shadow: f64, soiling: f64) -> Result<Self> {
        validate_loss_fraction("systemLossFraction", system)?;
        validate_loss_fraction("shadowLossFraction", shadow)?;
        validate_loss_fraction("soilingLossFraction", soiling)?;
        Ok(Self { system, shadow, soiling })
    }

    pub fn total_fraction(&self) -> f64 {
        let remaining = 1.0 - self.system;
        (self.system + self.soiling * remaining + self.shadow * remaining).min(MAX_TOTAL_LOSS)
    }
}

// ─── Weather jitter ──────────────────────────────────────────

/// Day-to-day production multiplier. Implementations must be pure: the same
/// day always yields the same factor.
pub trait WeatherJitter {
    fn factor(&self, day_of_year: i64, month0: u32) -> f64;
}

/// Cloud-cover stand-in in [0.75, 1.0] built from `sin` of a day seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededSineJitter;

impl WeatherJitter for SeededSineJitter {
    fn factor(&self, day_of_year: i64, month0: u32) -> f64 {
        let seed = (day_of_year * 7 + i64::from(month0)) as f64;
        0.75 + 0.25 * (seed * 1.37).sin().abs()
    }
}

/// No variation at all; every day gets the clear-sky monthly figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatJitter;

impl WeatherJitter for FlatJitter {
    fn factor(&self, _day_of_year: i64, _month0: u32) -> f64 {
        1.0
    }
}

// ─── Simulator ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProductionSimulator<J = SeededSineJitter> {
    latitude: f64,
    capacity_kw: f64,
    loss_fraction: f64,
    monthly_psh: [f64; 12],
    jitter: J,
}

impl ProductionSimulator<SeededSineJitter> {
    /// `capacity_kw` should already carry degradation; `loss_fraction` is the
    /// combined loss (see [`LossProfile::total_fraction`]).
    pub fn new(latitude: f64, capacity_kw: f64, loss_fraction: f64) -> Result<Self> {
        validate_capacity(capacity_kw)?;
        validate_loss_fraction("totalLossFraction", loss_fraction)?;
        Ok(Self {
            latitude,
            capacity_kw,
            loss_fraction,
            monthly_psh: monthly_peak_sun_hours(latitude),
            jitter: SeededSineJitter,
        })
    }
}

impl<J: WeatherJitter> ProductionSimulator<J> {
    /// Replace the modelled PSH table with externally measured values.
    pub fn with_monthly_psh(mut self, monthly_psh: [f64; 12]) -> Self {
        self.monthly_psh = monthly_psh;
        self
    }

    pub fn with_jitter<K: WeatherJitter>(self, jitter: K) -> ProductionSimulator<K> {
        ProductionSimulator {
            latitude: self.latitude,
            capacity_kw: self.capacity_kw,
            loss_fraction: self.loss_fraction,
            monthly_psh: self.monthly_psh,
            jitter,
        }
    }

    pub fn monthly_psh(&self) -> [f64; 12] {
        self.monthly_psh
    }

    pub fn psh_for(&self, date: NaiveDate) -> f64 {
        self.monthly_psh[date.month0() as usize]
    }

    fn derate(&self) -> f64 {
        self.capacity_kw * (1.0 - self.loss_fraction)
    }

    /// Production so far today and the full-day estimate, from a half-hour
    /// sine-intensity curve between sunrise and sunset.
    pub fn today_estimate(&self, now: NaiveDateTime) -> TodayEstimate {
        let psh = self.psh_for(now.date());
        let sun = sunrise_sunset(self.latitude, now.ordinal());
        let clock_h = f64::from(now.hour()) + f64::from(now.minute()) / 60.0;
        let span = sun.sunset - sun.sunrise;

        let mut today_so_far = 0.0;
        let mut full_day = 0.0;
        if span > 0.0 {
            let steps = (span / HALF_HOUR).floor() as u32;
            for k in 0..=steps {
                let h = sun.sunrise + HALF_HOUR * f64::from(k);
                let intensity = (PI * (h - sun.sunrise) / span).sin();
                let step_kwh = self.derate() * intensity * (psh / REFERENCE_PSH) * HALF_HOUR;
                full_day += step_kwh;
                if h <= clock_h {
                    today_so_far += step_kwh;
                }
            }
        }

        TodayEstimate {
            today_so_far: round_dp(today_so_far, 1),
            full_day_estimate: round_dp(full_day, 1),
            current_psh: psh,
            sunrise: round_dp(sun.sunrise, 1),
            sunset: round_dp(sun.sunset, 1),
        }
    }

    /// Instantaneous output on each whole hour from sunrise to sunset.
    pub fn today_hourly_curve(&self, today: NaiveDate) -> Vec<HourlyPoint> {
        let psh = self.psh_for(today);
        let sun = sunrise_sunset(self.latitude, today.ordinal());
        let span = sun.sunset - sun.sunrise;
        let first = sun.sunrise.floor() as u32;
        let last = sun.sunset.ceil() as u32;

        (first..=last)
            .map(|h| {
                let intensity = if span > 0.0 {
                    let fraction = ((f64::from(h) - sun.sunrise) / span).clamp(0.0, 1.0);
                    (PI * fraction).sin()
                } else {
                    0.0
                };
                HourlyPoint {
                    hour: format!("{h}:00"),
                    production_kw: round_dp(
                        (self.derate() * intensity * (psh / REFERENCE_PSH)).max(0.0),
                        2,
                    ),
                }
            })
            .collect()
    }

    fn daily_point(&self, label: String, date: NaiveDate, psh: f64, electricity_rate: f64) -> DailyPoint {
        let weather = self.jitter.factor(i64::from(date.ordinal()), date.month0());
        let production_kwh = round_dp(self.derate() * psh * weather, 1);
        DailyPoint {
            day: label,
            production_kwh,
            savings: (production_kwh * electricity_rate).round(),
        }
    }

    /// Monday-to-Sunday totals for the week containing `today`. The month's
    /// PSH is applied to every day so the week stays comparable.
    pub fn weekly_production_data(&self, today: NaiveDate, electricity_rate: f64) -> Vec<DailyPoint> {
        let psh = self.psh_for(today);
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        WEEKDAY_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let date = monday + Duration::days(i as i64);
                self.daily_point((*name).to_owned(), date, psh, electricity_rate)
            })
            .collect()
    }

    /// One point per calendar day of the month containing `today`.
    pub fn month_daily_production(&self, today: NaiveDate, electricity_rate: f64) -> Vec<DailyPoint> {
        let psh = self.psh_for(today);
        let Some(first) = today.with_day(1) else {
            return Vec::new();
        };

        first
            .iter_days()
            .take_while(|d| d.month() == today.month())
            .map(|date| self.daily_point(date.to_string(), date, psh, electricity_rate))
            .collect()
    }

    /// Monthly production with a seasonal self-consumption heuristic
    /// (65–75 % of production consumed on site).
    pub fn yearly_production_breakdown(&self) -> Vec<ProductionPoint> {
        MONTH_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let produced = (self.derate() * self.monthly_psh[i] * f64::from(DAYS_IN_MONTH[i])).round();
                let consumed = (produced * (0.65 + 0.1 * (i as f64 * PI / 6.0).sin())).round();
                ProductionPoint::new(*name, produced, consumed)
            })
            .collect()
    }

    pub fn yearly_total(&self) -> f64 {
        self.yearly_production_breakdown().iter().map(|p| p.produced_kwh).sum()
    }
}

/// Half-hour "today" estimate for a site without building a simulator first.
pub fn today_estimate(latitude: f64, capacity_kw: f64, total_loss_fraction: f64, now: NaiveDateTime) -> Result<TodayEstimate> {
    Ok(ProductionSimulator::new(latitude, capacity_kw, total_loss_fraction)?.today_estimate(now))
}

// ─── Self-consumption split ──────────────────────────────────

/// Share of household demand that coincides with production hours.
pub const DEFAULT_OVERLAP_FACTOR: f64 = 0.75;

/// Split a month's energy into self-consumed / exported / grid-import
/// percentages summing to exactly 100.
///
/// With a known household consumption, self-consumption is
/// `min(produced, consumption · overlap)`. Without one a heuristic applies,
/// rising from 65 % to 80 % as the panels get dirtier.
pub fn energy_split(
    produced_kwh: f64,
    monthly_consumption_kwh: Option<f64>,
    days_since_clean: u32,
    overlap_factor: f64,
) -> EnergySplit {
    match monthly_consumption_kwh {
        Some(consumption) if consumption > 0.0 && produced_kwh > 0.0 => {
            let self_kwh = produced_kwh.min(consumption * overlap_factor);
            let self_pct = (self_kwh / produced_kwh * 100.0).round();
            let exported_pct = 100.0 - self_pct;
            let grid_pct = ((consumption - self_kwh) / consumption * 100.0).round().max(0.0);

            let total = self_pct + exported_pct + grid_pct;
            if total > 0.0 && total != 100.0 {
                let scale = 100.0 / total;
                finish_split((self_pct * scale).round(), (exported_pct * scale).round())
            } else {
                finish_split(self_pct, exported_pct)
            }
        }
        // Demand but nothing produced: everything comes from the grid
        Some(consumption) if consumption > 0.0 => finish_split(0.0, 0.0),
        _ => {
            let self_pct = (65.0 + (f64::from(days_since_clean) * 0.3).min(15.0)).round();
            let exported_pct = (100.0 - self_pct - 8.0).max(0.0);
            finish_split(self_pct, exported_pct)
        }
    }
}

/// Last term absorbs rounding drift.
fn finish_split(self_pct: f64, exported_pct: f64) -> EnergySplit {
    let self_pct = self_pct.clamp(0.0, 100.0) as u32;
    let exported_pct = (exported_pct.max(0.0) as u32).min(100 - self_pct);
    EnergySplit {
        self_consumed_pct: self_pct,
        exported_pct,
        grid_import_pct: 100 - self_pct - exported_pct,
    }
}

// ─── External estimate reconciliation ───────────────────────

/// Acceptance band for an external annual estimate, as ratios of the
/// internal physics estimate. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SanityBand {
    pub lower_ratio: f64,
    pub upper_ratio: f64,
}

impl Default for SanityBand {
    fn default() -> Self {
        Self { lower_ratio: 0.5, upper_ratio: 2.0 }
    }
}

impl SanityBand {
    pub fn accepts(&self, internal: f64, candidate: f64) -> bool {
        candidate > internal * self.lower_ratio && candidate < internal * self.upper_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Physics,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reconciled {
    pub annual_kwh: f64,
    pub source: EstimateSource,
    /// Factor to apply to the physics curve to match `annual_kwh`
    pub scale_factor: f64,
}

/// Ratio between current conditions and the clean, undegraded conditions an
/// external design estimate assumes. Capped at 1 by the caller.
pub fn condition_factor(degradation: f64, soiling_fraction: f64, system_loss: f64, shadow_loss: f64) -> f64 {
    degradation * (1.0 - soiling_fraction) / (1.0 - system_loss - shadow_loss).max(0.05)
}

/// Decide between the internal physics estimate and an external one.
///
/// The external figure is first adjusted to current conditions, then adopted
/// only when it falls inside `band`; otherwise the physics value is kept.
pub fn reconcile_annual_estimate(
    internal_kwh: f64,
    external_kwh: Option<f64>,
    condition: f64,
    band: &SanityBand,
) -> Reconciled {
    let physics = Reconciled {
        annual_kwh: internal_kwh,
        source: EstimateSource::Physics,
        scale_factor: 1.0,
    };
    let Some(external) = external_kwh.filter(|e| e.is_finite() && *e > 0.0) else {
        return physics;
    };
    if internal_kwh <= 0.0 {
        return physics;
    }

    let adjusted = (external * condition.min(1.0)).round();
    if band.accepts(internal_kwh, adjusted) {
        debug!(internal_kwh, adjusted, "adopting external annual estimate");
        Reconciled {
            annual_kwh: adjusted,
            source: EstimateSource::External,
            scale_factor: adjusted / internal_kwh,
        }
    } else {
        warn!(
            internal_kwh,
            adjusted,
            lower = band.lower_ratio,
            upper = band.upper_ratio,
            "external annual estimate outside sanity band, keeping physics estimate"
        );
        physics
    }
}

/// Rescale a monthly breakdown to a reconciled total.
pub fn apply_reconciliation(breakdown: &[ProductionPoint], reconciled: &Reconciled) -> Vec<ProductionPoint> {
    match reconciled.source {
        EstimateSource::Physics => breakdown.to_vec(),
        EstimateSource::External => breakdown.iter().map(|p| p.scaled(reconciled.scale_factor)).collect(),
    }
}
