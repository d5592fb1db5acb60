/// ============================================================
///  Financial ROI Engine
///
///  Monthly cash-flow simulation over `years × 12` months:
///   1. Production degrades by a compounding %/year
///   2. The electricity tariff inflates by a fixed %/year
///   3. Production is split into self-consumed and exported energy,
///      valued at the tariff and at the feed-in rate respectively
///   4. Maintenance and (while the loan runs) the EMI are deducted
///   5. The first month with cumulative cash flow ≥ 0 is break-even
///
///  Yearly net savings then feed NPV (fixed discount rate) and an
///  IRR root search (Newton–Raphson, bisection fallback).
/// ============================================================

use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::models::finance::{
    FinancingSummary, FinancingTerms, IrrEstimate, LoanComparison, LoanOffer, RoiParams, RoiResult,
    SubsidyEstimate, YearlyBucket,
};
use crate::services::{TREES_PER_TON_CO2, degradation_factor, round_dp, validate_horizon};

const IRR_INITIAL_GUESS: f64 = 0.10;
const IRR_MAX_ITERATIONS: u32 = 100;
const IRR_TOLERANCE: f64 = 1e-6;
const IRR_MIN_DERIVATIVE: f64 = 1e-10;
/// Bisection bracket for the fallback search
const IRR_BRACKET: (f64, f64) = (-0.99, 10.0);

const DEFAULT_DOWN_PAYMENT_SHARE: f64 = 0.20;
pub const MAX_COMPARED_OFFERS: usize = 4;

// ─── Loan maths ──────────────────────────────────────────────

/// Fixed monthly instalment for an amortised loan.
///
/// `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate; a zero rate
/// degenerates to `P / n`. A zero-month term repays everything at once.
pub fn calculate_emi(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal;
    }
    let n = f64::from(term_months);
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Resolved loan structure for a purchase of `effective_cost`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanPlan {
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_emi: f64,
    pub term_months: u32,
}

impl LoanPlan {
    pub fn cash(effective_cost: f64) -> Self {
        Self { down_payment: effective_cost, loan_amount: 0.0, monthly_emi: 0.0, term_months: 0 }
    }

    /// An explicit principal wins; otherwise the loan covers whatever the
    /// down payment (default 20 %) leaves.
    pub fn from_terms(effective_cost: f64, terms: &FinancingTerms) -> Self {
        let (down_payment, loan_amount) = match (terms.principal, terms.down_payment) {
            (Some(p), _) => {
                let loan = p.clamp(0.0, effective_cost.max(0.0));
                (effective_cost - loan, loan)
            }
            (None, Some(d)) => (d, (effective_cost - d).max(0.0)),
            (None, None) => {
                let d = effective_cost * DEFAULT_DOWN_PAYMENT_SHARE;
                (d, effective_cost - d)
            }
        };
        Self {
            down_payment,
            loan_amount,
            monthly_emi: calculate_emi(loan_amount, terms.annual_rate_pct, terms.term_months),
            term_months: terms.term_months,
        }
    }

    /// Instalment due in a 1-based month; zero once the term has run out.
    pub fn payment_for_month(&self, month: u32) -> f64 {
        if month <= self.term_months { self.monthly_emi } else { 0.0 }
    }

    pub fn summary(&self) -> FinancingSummary {
        let total = self.monthly_emi * f64::from(self.term_months);
        FinancingSummary {
            loan_amount: self.loan_amount.round(),
            down_payment: self.down_payment.round(),
            monthly_emi: round_dp(self.monthly_emi, 2),
            total_loan_cost: total.round(),
            total_interest: (total - self.loan_amount).round(),
            term_months: self.term_months,
        }
    }
}

// ─── Monthly simulation ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFlow {
    pub month: u32,
    pub year: u32,
    pub production_kwh: f64,
    pub electricity_rate: f64,
    pub degradation: f64,
    /// Self-consumption savings plus export revenue
    pub gross_savings: f64,
    pub loan_payment: f64,
    pub net: f64,
    pub cumulative: f64,
}

fn validate(params: &RoiParams) -> Result<()> {
    let non_negative = [
        ("systemCost", params.system_cost),
        ("annualProduction", params.annual_production),
        ("electricityRate", params.electricity_rate),
        ("maintenanceCost", params.maintenance_cost),
        ("subsidyAmount", params.subsidy_amount),
    ];
    let non_negative_rates = [
        ("netMeteringRate", params.net_metering_rate),
        ("taxBenefit", params.tax_benefit),
        ("co2FactorKgPerKwh", params.co2_factor_kg_per_kwh),
    ];
    for (name, value) in non_negative.into_iter().chain(non_negative_rates) {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidParameter { name, reason: format!("{value} must be finite and >= 0") });
        }
    }
    if !params.rate_inflation_pct.is_finite() || params.rate_inflation_pct <= -100.0 {
        return Err(EngineError::InvalidParameter {
            name: "rateInflationPct",
            reason: format!("{} must be finite and > -100", params.rate_inflation_pct),
        });
    }
    if !(0.0..100.0).contains(&params.panel_degradation_pct) {
        return Err(EngineError::InvalidParameter {
            name: "panelDegradationPct",
            reason: format!("{} is not within [0, 100)", params.panel_degradation_pct),
        });
    }
    if !(0.0..=1.0).contains(&params.self_consumption_ratio) {
        return Err(EngineError::InvalidParameter {
            name: "selfConsumptionRatio",
            reason: format!("{} is not within [0, 1]", params.self_consumption_ratio),
        });
    }
    validate_horizon(params.years)?;
    if !params.discount_rate.is_finite() || params.discount_rate <= -1.0 {
        return Err(EngineError::InvalidParameter {
            name: "discountRate",
            reason: format!("{} must be finite and > -1", params.discount_rate),
        });
    }
    if let Some(terms) = &params.financing {
        if terms.term_months == 0 {
            return Err(EngineError::InvalidParameter { name: "termMonths", reason: "must be at least 1".to_owned() });
        }
        if !terms.annual_rate_pct.is_finite() || terms.annual_rate_pct < 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "annualRatePct",
                reason: format!("{} must be finite and >= 0", terms.annual_rate_pct),
            });
        }
    }
    Ok(())
}

fn loan_plan(params: &RoiParams) -> LoanPlan {
    let effective_cost = params.system_cost - params.subsidy_amount;
    match &params.financing {
        Some(terms) => LoanPlan::from_terms(effective_cost, terms),
        None => LoanPlan::cash(effective_cost),
    }
}

/// Month-by-month cash flow over the whole horizon. Cumulative cash flow
/// starts at minus the up-front payment.
pub fn monthly_cash_flows(params: &RoiParams) -> Result<Vec<MonthlyFlow>> {
    validate(params)?;
    let plan = loan_plan(params);
    Ok(simulate(params, &plan))
}

fn simulate(params: &RoiParams, plan: &LoanPlan) -> Vec<MonthlyFlow> {
    let months = params.years * 12;
    let monthly_maintenance = params.maintenance_cost / 12.0;
    let monthly_tax_benefit = params.tax_benefit / 12.0;
    let mut cumulative = -plan.down_payment;

    (1..=months)
        .map(|month| {
            let year = (month - 1) / 12 + 1;
            let elapsed = f64::from(year - 1);
            let degradation = degradation_factor(params.panel_degradation_pct, elapsed);
            let production_kwh = params.annual_production / 12.0 * degradation;
            let electricity_rate = params.electricity_rate * (1.0 + params.rate_inflation_pct / 100.0).powf(elapsed);

            let self_consumed = production_kwh * params.self_consumption_ratio;
            let exported = production_kwh - self_consumed;
            let export_revenue = if params.net_metering { exported * params.net_metering_rate } else { 0.0 };
            let gross_savings = self_consumed * electricity_rate + export_revenue;

            let loan_payment = plan.payment_for_month(month);
            let net = gross_savings + monthly_tax_benefit - monthly_maintenance - loan_payment;
            cumulative += net;

            MonthlyFlow {
                month,
                year,
                production_kwh,
                electricity_rate,
                degradation,
                gross_savings,
                loan_payment,
                net,
                cumulative,
            }
        })
        .collect()
}

// ─── Discounted cash flow ────────────────────────────────────

/// NPV of yearly flows (year 1 discounted once) after an up-front outlay.
pub fn net_present_value(initial_outlay: f64, yearly_flows: &[f64], discount_rate: f64) -> f64 {
    yearly_flows
        .iter()
        .enumerate()
        .fold(-initial_outlay, |acc, (i, flow)| acc + flow / (1.0 + discount_rate).powi(i as i32 + 1))
}

fn npv_and_derivative(initial_outlay: f64, yearly_flows: &[f64], rate: f64) -> (f64, f64) {
    yearly_flows.iter().enumerate().fold((-initial_outlay, 0.0), |(f, df), (i, flow)| {
        let t = i as f64 + 1.0;
        (f + flow / (1.0 + rate).powf(t), df - t * flow / (1.0 + rate).powf(t + 1.0))
    })
}

/// Internal rate of return of the same cash flows [`net_present_value`] uses.
///
/// Newton–Raphson from 10 %, at most 100 steps, stopping once successive
/// estimates differ by less than 1e-6. If Newton leaves the domain (rate
/// ≤ −99 %) or stalls, a bisection over [−99 %, 1000 %] takes over when the
/// bracket changes sign. When neither settles, the last finite estimate is
/// returned with `converged = false`; this function never fails.
pub fn internal_rate_of_return(initial_outlay: f64, yearly_flows: &[f64]) -> IrrEstimate {
    let mut rate = IRR_INITIAL_GUESS;
    let mut iterations = 0;

    while iterations < IRR_MAX_ITERATIONS {
        iterations += 1;
        let (f, df) = npv_and_derivative(initial_outlay, yearly_flows, rate);
        if df.abs() < IRR_MIN_DERIVATIVE {
            break;
        }
        let next = rate - f / df;
        if !next.is_finite() || next <= IRR_BRACKET.0 {
            break;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return IrrEstimate { rate: next, iterations, converged: true };
        }
        rate = next;
    }

    debug!(rate, iterations, "newton did not settle on an IRR, trying bisection");
    bisect_irr(initial_outlay, yearly_flows).unwrap_or(IrrEstimate { rate, iterations, converged: false })
}

fn bisect_irr(initial_outlay: f64, yearly_flows: &[f64]) -> Option<IrrEstimate> {
    let npv = |r: f64| npv_and_derivative(initial_outlay, yearly_flows, r).0;
    let (mut lo, mut hi) = IRR_BRACKET;
    let mut f_lo = npv(lo);
    if f_lo * npv(hi) > 0.0 {
        return None;
    }

    for iterations in 1..=IRR_MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(mid);
        if f_mid == 0.0 || (hi - lo) * 0.5 < IRR_TOLERANCE {
            return Some(IrrEstimate { rate: mid, iterations, converged: true });
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    Some(IrrEstimate { rate: 0.5 * (lo + hi), iterations: IRR_MAX_ITERATIONS, converged: false })
}

// ─── ROI ─────────────────────────────────────────────────────

/// Full ROI simulation: break-even, lifetime savings, NPV, IRR and CO₂ offset.
pub fn calculate_roi(params: &RoiParams) -> Result<RoiResult> {
    validate(params)?;
    let plan = loan_plan(params);
    let flows = simulate(params, &plan);
    let effective_cost = params.system_cost - params.subsidy_amount;

    let break_even_month = flows.iter().find(|m| m.cumulative >= 0.0).map(|m| m.month);

    let mut yearly_net = Vec::with_capacity(params.years as usize);
    let mut yearly_data = Vec::with_capacity(params.years as usize);
    for year in flows.chunks(12) {
        let last = year[year.len() - 1];
        let production: f64 = year.iter().map(|m| m.production_kwh).sum();
        let net: f64 = year.iter().map(|m| m.net).sum();
        yearly_net.push(net);
        yearly_data.push(YearlyBucket {
            year: last.year,
            production_kwh: production.round(),
            net_savings: net.round(),
            cumulative_savings: last.cumulative.round(),
            electricity_rate: round_dp(last.electricity_rate, 2),
            efficiency_pct: round_dp(last.degradation * 100.0, 1),
        });

        #[cfg(feature = "verbose_log")]
        debug!(year = last.year, production, net, cumulative = last.cumulative, "roi year");
    }

    let lifetime_savings = flows.last().map_or(-plan.down_payment, |m| m.cumulative);
    let total_savings: f64 = flows.iter().map(|m| m.gross_savings).sum();
    let total_production: f64 = flows.iter().map(|m| m.production_kwh).sum();
    let co2_offset_tons = total_production * params.co2_factor_kg_per_kwh / 1000.0;

    let npv = net_present_value(plan.down_payment, &yearly_net, params.discount_rate);
    let irr = internal_rate_of_return(plan.down_payment, &yearly_net);

    let roi_pct = if effective_cost > 0.0 { lifetime_savings / effective_cost * 100.0 } else { 0.0 };

    Ok(RoiResult {
        system_cost: params.system_cost.round(),
        effective_cost: effective_cost.round(),
        subsidy_amount: params.subsidy_amount.round(),
        break_even_month,
        break_even_year: break_even_month.map(|m| round_dp(f64::from(m) / 12.0, 1)),
        lifetime_savings: lifetime_savings.round(),
        total_savings: total_savings.round(),
        npv: npv.round(),
        irr_pct: round_dp(irr.rate * 100.0, 2),
        irr_converged: irr.converged,
        roi_pct: round_dp(roi_pct, 1),
        co2_offset_tons: round_dp(co2_offset_tons, 2),
        trees_equivalent: (co2_offset_tons * TREES_PER_TON_CO2).round() as u64,
        financing: params.financing.as_ref().map(|_| plan.summary()),
        yearly_data,
    })
}

// ─── Loan comparison ─────────────────────────────────────────

/// Side-by-side cost of up to four loan offers for the same principal.
/// Without an explicit amount each offer is priced at the middle of its range.
pub fn compare_loans(offers: &[LoanOffer], loan_amount: Option<f64>) -> Result<Vec<LoanComparison>> {
    if offers.is_empty() || offers.len() > MAX_COMPARED_OFFERS {
        return Err(EngineError::InvalidParameter {
            name: "offers",
            reason: format!("provide 1-{MAX_COMPARED_OFFERS} offers to compare, got {}", offers.len()),
        });
    }

    offers
        .iter()
        .map(|offer| {
            if offer.term_months == 0 {
                return Err(EngineError::InvalidParameter {
                    name: "termMonths",
                    reason: format!("offer from {} has a zero-month term", offer.provider),
                });
            }
            let principal = loan_amount.unwrap_or((offer.max_amount + offer.min_amount) / 2.0);
            let emi = calculate_emi(principal, offer.annual_rate_pct, offer.term_months);
            let total_payment = emi * f64::from(offer.term_months);
            let processing_fee = principal * offer.processing_fee_pct / 100.0;
            Ok(LoanComparison {
                provider: offer.provider.clone(),
                principal: round_dp(principal, 2),
                emi: round_dp(emi, 2),
                total_payment: round_dp(total_payment, 2),
                total_interest: round_dp(total_payment - principal, 2),
                processing_fee: round_dp(processing_fee, 2),
                effective_cost: round_dp(total_payment + processing_fee, 2),
            })
        })
        .collect()
}

// ─── Subsidy ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SubsidyTier {
    pub up_to_kw: f64,
    pub per_kw: f64,
    pub cap: f64,
}

/// Residential rooftop capacity subsidy, first matching tier applies.
pub const SUBSIDY_TIERS: [SubsidyTier; 3] = [
    SubsidyTier { up_to_kw: 2.0, per_kw: 30_000.0, cap: 60_000.0 },
    SubsidyTier { up_to_kw: 3.0, per_kw: 18_000.0, cap: 78_000.0 },
    SubsidyTier { up_to_kw: 10.0, per_kw: 9_000.0, cap: 78_000.0 },
];
const SUBSIDY_CEILING: f64 = 78_000.0;

pub fn estimate_subsidy(system_size_kw: f64) -> SubsidyEstimate {
    let kw = if system_size_kw.is_finite() { system_size_kw.max(0.0) } else { 0.0 };
    let estimated_subsidy = SUBSIDY_TIERS
        .iter()
        .find(|t| kw <= t.up_to_kw)
        .map_or(SUBSIDY_CEILING, |t| (kw * t.per_kw).min(t.cap));
    SubsidyEstimate { system_size_kw: kw, estimated_subsidy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MAX_HORIZON_YEARS;

    fn scenario() -> RoiParams {
        RoiParams {
            system_cost: 500_000.0,
            system_size: 6.4,
            annual_production: 9_000.0,
            electricity_rate: 55.0,
            years: 25,
            ..RoiParams::default()
        }
    }

    #[test]
    fn test_emi_zero_rate_is_exact_division() {
        assert_eq!(calculate_emi(120_000.0, 0.0, 36), 120_000.0 / 36.0);
        assert_eq!(calculate_emi(1_000.0, 0.0, 7), 1_000.0 / 7.0);
    }

    #[test]
    fn test_emi_standard_formula() {
        // 100k at 12 %/yr over 12 months
        let emi = calculate_emi(100_000.0, 12.0, 12);
        assert!((emi - 8_884.88).abs() < 0.01, "emi {emi}");
    }

    #[test]
    fn test_scenario_breaks_even() {
        let r = calculate_roi(&scenario()).unwrap();
        let month = r.break_even_month.expect("should break even");
        assert!(month < 25 * 12);
        assert!(r.npv.is_finite() && r.irr_pct.is_finite());
        assert!(r.irr_converged);
        assert!(r.npv > 0.0);
        assert_eq!(r.yearly_data.len(), 25);
        assert!(r.financing.is_none());
    }

    #[test]
    fn test_never_breaks_even_is_none() {
        let params = RoiParams {
            system_cost: 10_000_000.0,
            annual_production: 100.0,
            electricity_rate: 1.0,
            maintenance_cost: 0.0,
            years: 5,
            ..RoiParams::default()
        };
        let r = calculate_roi(&params).unwrap();
        assert_eq!(r.break_even_month, None);
        assert_eq!(r.break_even_year, None);
        assert!(r.npv < 0.0);
        assert!(r.irr_pct.is_finite());
    }

    #[test]
    fn test_zero_interest_loan_schedule() {
        let params = RoiParams {
            financing: Some(FinancingTerms {
                principal: None,
                annual_rate_pct: 0.0,
                term_months: 24,
                down_payment: Some(100_000.0),
            }),
            ..scenario()
        };
        let flows = monthly_cash_flows(&params).unwrap();
        let loan_amount = 400_000.0;
        let emi = loan_amount / 24.0;

        assert_eq!(flows[0].cumulative, -100_000.0 + flows[0].net);
        assert_eq!(flows[23].loan_payment, emi); // month 24
        assert_eq!(flows[24].loan_payment, 0.0); // month 25
        assert!(flows[24..].iter().all(|m| m.loan_payment == 0.0));

        let r = calculate_roi(&params).unwrap();
        let f = r.financing.unwrap();
        assert_eq!(f.monthly_emi, round_dp(emi, 2));
        assert_eq!(f.loan_amount, loan_amount);
        assert_eq!(f.total_interest, 0.0);
    }

    #[test]
    fn test_default_down_payment_is_twenty_percent() {
        let plan = LoanPlan::from_terms(
            500_000.0,
            &FinancingTerms { principal: None, annual_rate_pct: 9.0, term_months: 60, down_payment: None },
        );
        assert_eq!(plan.down_payment, 100_000.0);
        assert_eq!(plan.loan_amount, 400_000.0);

        let explicit = LoanPlan::from_terms(
            500_000.0,
            &FinancingTerms { principal: Some(300_000.0), annual_rate_pct: 9.0, term_months: 60, down_payment: None },
        );
        assert_eq!(explicit.down_payment, 200_000.0);
    }

    #[test]
    fn test_first_year_bucket_matches_annual_production() {
        let r = calculate_roi(&scenario()).unwrap();
        assert_eq!(r.yearly_data[0].production_kwh, 9_000.0);
        assert_eq!(r.yearly_data[0].efficiency_pct, 100.0);
        // compounding degradation
        let y2 = r.yearly_data[1].production_kwh;
        assert!((y2 - 9_000.0 * 0.995).abs() <= 0.5, "year 2 {y2}");
    }

    #[test]
    fn test_subsidy_reduces_effective_cost() {
        let with = calculate_roi(&RoiParams { subsidy_amount: 78_000.0, ..scenario() }).unwrap();
        let without = calculate_roi(&scenario()).unwrap();
        assert_eq!(with.effective_cost, 422_000.0);
        assert!(with.npv > without.npv);
        assert!(with.break_even_month <= without.break_even_month);
    }

    #[test]
    fn test_npv_matches_hand_calculation() {
        let npv = net_present_value(1000.0, &[500.0, 500.0, 500.0], 0.10);
        let expected = -1000.0 + 500.0 / 1.1 + 500.0 / 1.21 + 500.0 / 1.331;
        assert!((npv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_irr_known_value() {
        // -1000 then 3 × 500 → IRR ≈ 23.375 %
        let irr = internal_rate_of_return(1000.0, &[500.0, 500.0, 500.0]);
        assert!(irr.converged);
        assert!((irr.rate - 0.23375).abs() < 1e-4, "irr {}", irr.rate);
        let npv = net_present_value(1000.0, &[500.0, 500.0, 500.0], irr.rate);
        assert!(npv.abs() < 1e-3);
    }

    #[test]
    fn test_irr_without_root_returns_a_number() {
        // flows never pay anything back
        let irr = internal_rate_of_return(1000.0, &[0.0, 0.0, 0.0]);
        assert!(irr.rate.is_finite());
        assert!(!irr.converged);
        assert!(irr.iterations <= IRR_MAX_ITERATIONS);
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(calculate_roi(&RoiParams { years: 0, ..scenario() }).is_err());
        assert!(calculate_roi(&RoiParams { system_cost: -1.0, ..scenario() }).is_err());
        assert!(calculate_roi(&RoiParams { self_consumption_ratio: 1.5, ..scenario() }).is_err());
    }

    #[test]
    fn test_horizon_is_capped() {
        assert!(calculate_roi(&RoiParams { years: MAX_HORIZON_YEARS, ..scenario() }).is_ok());
        for years in [MAX_HORIZON_YEARS + 1, 100_000_000, u32::MAX / 12 + 1] {
            match calculate_roi(&RoiParams { years, ..scenario() }) {
                Err(EngineError::InvalidParameter { name, .. }) => assert_eq!(name, "years"),
                other => panic!("horizon {years} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_finite_and_out_of_range_rates_rejected() {
        let bad = [
            RoiParams { discount_rate: f64::NAN, ..scenario() },
            RoiParams { rate_inflation_pct: -250.0, ..scenario() },
            RoiParams { rate_inflation_pct: f64::INFINITY, ..scenario() },
            RoiParams { panel_degradation_pct: 100.0, ..scenario() },
            RoiParams { panel_degradation_pct: -1.0, ..scenario() },
            RoiParams { net_metering_rate: f64::NAN, ..scenario() },
            RoiParams { tax_benefit: -5.0, ..scenario() },
            RoiParams { co2_factor_kg_per_kwh: f64::INFINITY, ..scenario() },
        ];
        for params in &bad {
            assert!(
                matches!(calculate_roi(params), Err(EngineError::InvalidParameter { .. })),
                "accepted {params:?}"
            );
        }
    }

    #[test]
    fn test_compare_loans() {
        let offers = vec![
            LoanOffer {
                provider: "Bank A".to_owned(),
                annual_rate_pct: 0.0,
                term_months: 10,
                min_amount: 100_000.0,
                max_amount: 300_000.0,
                processing_fee_pct: 1.0,
            },
            LoanOffer {
                provider: "Bank B".to_owned(),
                annual_rate_pct: 12.0,
                term_months: 12,
                min_amount: 50_000.0,
                max_amount: 150_000.0,
                processing_fee_pct: 0.0,
            },
        ];
        let c = compare_loans(&offers, None).unwrap();
        assert_eq!(c[0].principal, 200_000.0);
        assert_eq!(c[0].emi, 20_000.0);
        assert_eq!(c[0].total_interest, 0.0);
        assert_eq!(c[0].effective_cost, 202_000.0);
        assert_eq!(c[1].principal, 100_000.0);
        assert!(c[1].total_interest > 0.0);

        assert!(compare_loans(&[], None).is_err());
        assert!(compare_loans(&vec![offers[0].clone(); 5], None).is_err());
    }

    #[test]
    fn test_subsidy_tiers() {
        assert_eq!(estimate_subsidy(1.5).estimated_subsidy, 45_000.0);
        assert_eq!(estimate_subsidy(2.0).estimated_subsidy, 60_000.0);
        assert_eq!(estimate_subsidy(3.0).estimated_subsidy, 54_000.0);
        assert_eq!(estimate_subsidy(8.0).estimated_subsidy, 72_000.0);
        assert_eq!(estimate_subsidy(9.0).estimated_subsidy, 78_000.0);
        assert_eq!(estimate_subsidy(25.0).estimated_subsidy, 78_000.0);
        assert_eq!(estimate_subsidy(-1.0).estimated_subsidy, 0.0);
    }
}
