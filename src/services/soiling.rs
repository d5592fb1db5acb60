// ============================================================
//  Soiling / Dust Accumulation Model
//
//  Efficiency loss saturates exponentially with the days elapsed
//  since the last cleaning:
//
//      loss(d) = maxLoss · (1 − e^(−rate·d / maxLoss))
//
//  loss(0) = 0, the slope at day 0 equals `rate`, and the loss never
//  exceeds `maxLoss`. The dust index is a linear ×2.5 transform of
//  the loss, capped at 100 %.
// ============================================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EngineError, Result};
use crate::models::energy::SoilingLoss;
use crate::models::site::SoilingState;
use crate::services::round_dp;

const DUST_PER_LOSS_PCT: f64 = 2.5;
const FORECAST_DAYS: u32 = 7;
const CALENDAR_EVENTS: u32 = 6;
const CALENDAR_SPACING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SoilingModel {
    /// Initial soiling rate (% efficiency per day)
    pub rate_pct_per_day: f64,
    /// Asymptotic ceiling of the efficiency loss (%)
    pub max_loss_pct: f64,
}

impl Default for SoilingModel {
    fn default() -> Self {
        Self { rate_pct_per_day: 0.30, max_loss_pct: 40.0 }
    }
}

impl SoilingModel {
    pub fn validate(&self) -> Result<()> {
        if !self.rate_pct_per_day.is_finite() || self.rate_pct_per_day < 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "ratePctPerDay",
                reason: format!("{} is not a non-negative rate", self.rate_pct_per_day),
            });
        }
        if !self.max_loss_pct.is_finite() || !(0.0..100.0).contains(&self.max_loss_pct) || self.max_loss_pct == 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "maxLossPct",
                reason: format!("{} is not in (0, 100)", self.max_loss_pct),
            });
        }
        Ok(())
    }

    /// Efficiency loss in percent after `days` without cleaning.
    pub fn efficiency_loss_pct(&self, days: u32) -> f64 {
        let x = self.rate_pct_per_day * f64::from(days) / self.max_loss_pct;
        // −expm1(−x) = 1 − e^(−x) without cancellation for small x
        -self.max_loss_pct * (-x).exp_m1()
    }

    pub fn loss(&self, state: SoilingState) -> SoilingLoss {
        let eff = self.efficiency_loss_pct(state.days_since_clean);
        SoilingLoss {
            dust_level_pct: (eff * DUST_PER_LOSS_PCT).min(100.0),
            efficiency_loss_pct: eff,
        }
    }

    /// Loss as a fraction in [0, 1), ready to feed the production simulator.
    pub fn loss_fraction(&self, state: SoilingState) -> f64 {
        self.efficiency_loss_pct(state.days_since_clean) / 100.0
    }
}

/// Soiling loss under the default model.
pub fn soiling_loss(days_since_clean: u32) -> SoilingLoss {
    SoilingModel::default().loss(SoilingState::new(days_since_clean))
}

/// 0–100 urgency score for the current efficiency loss (%).
pub fn cleaning_urgency_score(efficiency_loss_pct: f64) -> f64 {
    let e = efficiency_loss_pct;
    let score = if e > 15.0 {
        70.0 + e
    } else if e > 8.0 {
        40.0 + e * 2.0
    } else if e > 3.0 {
        10.0 + e * 4.0
    } else {
        e * 3.0
    };
    round_dp(score.clamp(0.0, 100.0), 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

pub fn urgency_level(days_since_clean: u32, efficiency_loss_pct: f64) -> Urgency {
    if days_since_clean > 45 || efficiency_loss_pct > 12.0 {
        Urgency::High
    } else if days_since_clean > 25 || efficiency_loss_pct > 5.0 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Coarse dust label shown on the dashboard.
pub fn dust_label(days_since_clean: u32) -> Urgency {
    match days_since_clean {
        d if d > 25 => Urgency::High,
        d if d > 12 => Urgency::Medium,
        _ => Urgency::Low,
    }
}

// ─── Cleaning schedule ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningInputs {
    pub days_since_clean: u32,
    pub capacity_kw: f64,
    /// PSH for the current month
    pub peak_sun_hours: f64,
    pub electricity_rate: f64,
    pub currency_code: String,
    pub cleaning_cost: f64,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub dust_level_pct: f64,
    pub efficiency_loss_pct: f64,
    pub good_day_to_clean: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningSchedule {
    pub recommended_date: NaiveDate,
    pub urgency: Urgency,
    pub urgency_score: f64,
    pub current_efficiency_loss_pct: f64,
    /// Efficiency regained by cleaning now (%)
    pub estimated_recovery_pct: f64,
    pub daily_loss_cost: f64,
    pub cleaning_cost: f64,
    pub electricity_rate: f64,
    pub currency_code: String,
    /// Days of soiling loss that add up to one cleaning's cost
    pub payback_days: f64,
    /// 30-day loss cost over the cleaning cost
    pub cost_benefit_ratio: f64,
    pub recommendation: String,
    pub forecast: Vec<ForecastDay>,
    pub calendar: Vec<NaiveDate>,
}

impl SoilingModel {
    /// Recommend when to clean, based on what the accumulated soiling costs per day.
    pub fn cleaning_schedule(&self, inputs: &CleaningInputs) -> CleaningSchedule {
        let days = inputs.days_since_clean;
        let eff = round_dp(self.efficiency_loss_pct(days), 1);

        let daily_production = inputs.capacity_kw.max(0.0) * inputs.peak_sun_hours;
        let daily_loss_cost = daily_production * (eff / 100.0) * inputs.electricity_rate;
        let payback_days = (inputs.cleaning_cost / daily_loss_cost.max(0.01)).max(1.0);
        let next_clean_days = (payback_days.round() as u32).clamp(1, FORECAST_DAYS);

        let forecast = (0..FORECAST_DAYS)
            .map(|i| {
                let loss = self.loss(SoilingState::new(days.saturating_add(i)));
                ForecastDay {
                    date: inputs.today + Duration::days(i64::from(i)),
                    dust_level_pct: round_dp(loss.dust_level_pct, 1),
                    efficiency_loss_pct: round_dp(loss.efficiency_loss_pct, 1),
                    good_day_to_clean: i + 1 == next_clean_days,
                }
            })
            .collect();

        let calendar = (1..=CALENDAR_EVENTS)
            .map(|i| inputs.today + Duration::days(i64::from(i) * CALENDAR_SPACING_DAYS))
            .collect();

        CleaningSchedule {
            recommended_date: inputs.today + Duration::days(i64::from(next_clean_days - 1)),
            urgency: urgency_level(days, eff),
            urgency_score: cleaning_urgency_score(eff),
            current_efficiency_loss_pct: eff,
            estimated_recovery_pct: eff,
            daily_loss_cost: round_dp(daily_loss_cost, 2),
            cleaning_cost: inputs.cleaning_cost,
            electricity_rate: inputs.electricity_rate,
            currency_code: inputs.currency_code.clone(),
            payback_days: round_dp(payback_days, 1),
            cost_benefit_ratio: round_dp(daily_loss_cost * 30.0 / inputs.cleaning_cost.max(1.0), 2),
            recommendation: format!(
                "Clean panels within {next_clean_days} day(s) to recover {eff}% efficiency"
            ),
            forecast,
            calendar,
        }
    }
}
