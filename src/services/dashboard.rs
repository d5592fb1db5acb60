/// ============================================================
///  Dashboard Aggregator
///
///  Builds one consistent snapshot from whatever the user has
///  stored: latest design, location passed with the request,
///  property profile, active system. Each field is taken from the
///  first source in that order that has it; anything still
///  missing is derived or defaulted, and the origin of every field
///  is kept as provenance.
///
///  All energy figures come from one simulator instance, so
///  today / this month / this year never disagree.
/// ============================================================

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::models::dashboard::{
    ActiveSystemRecord, Coordinates, DashboardRequest, DashboardSnapshot, DesignRecord, EnergyBlock,
    EnvironmentalBlock, FinancialBlock, LocationBlock, PropertyRecord, SystemHealth,
};
use crate::models::site::{SiteLocation, SoilingState, SystemConfig};
use crate::services::engine::EngineSettings;
use crate::services::production::{
    LossProfile, ProductionSimulator, apply_reconciliation, condition_factor, energy_split, reconcile_annual_estimate,
};
use crate::services::region::resolve_with_override;
use crate::services::soiling::dust_label;
use crate::services::{MILES_PER_TON_CO2, TREES_PER_TON_CO2, degradation_factor, round_dp};

pub const DEFAULT_SOURCE: &str = "default";
pub const DERIVED_SOURCE: &str = "derived";
const CLEANING_LOG_SOURCE: &str = "cleaningLog";
const CLEANING_INTERVAL_DAYS: i64 = 30;
const NO_BREAK_EVEN_YEARS: f64 = 99.0;

// ─── Sources ─────────────────────────────────────────────────

/// The fields any stored record may contribute, already in engine units
/// (fractions, not percentages).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    pub location: Option<Coordinates>,
    pub capacity_kw: Option<f64>,
    pub panel_count: Option<u32>,
    pub panel_wattage_w: Option<f64>,
    pub panel_model: Option<String>,
    pub tilt_deg: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub system_loss_fraction: Option<f64>,
    pub shadow_loss_fraction: Option<f64>,
    pub installed_date: Option<NaiveDate>,
    pub monthly_psh: Option<[f64; 12]>,
    pub annual_production_kwh: Option<f64>,
    pub monthly_consumption_kwh: Option<f64>,
    pub system_cost: Option<f64>,
    pub annual_savings: Option<f64>,
    pub lifetime_savings: Option<f64>,
    pub break_even_years: Option<f64>,
    pub co2_offset_tons: Option<f64>,
}

pub trait DataSource {
    fn name(&self) -> &'static str;
    fn record(&self) -> SourceRecord;
}

impl DataSource for DesignRecord {
    fn name(&self) -> &'static str {
        "design"
    }

    fn record(&self) -> SourceRecord {
        SourceRecord {
            location: self.location,
            capacity_kw: self.total_capacity_kw,
            panel_count: self.panel_count,
            panel_wattage_w: self.panel_wattage_w,
            panel_model: self.panel_model.clone(),
            tilt_deg: self.tilt_deg,
            azimuth_deg: self.azimuth_deg,
            system_loss_fraction: self.system_losses_pct.map(|p| p / 100.0),
            shadow_loss_fraction: self.annual_shadow_loss_pct.map(|p| p / 100.0),
            monthly_psh: self
                .monthly_psh
                .as_deref()
                .and_then(|v| <[f64; 12]>::try_from(v).ok())
                .filter(|psh| psh.iter().all(|p| p.is_finite() && *p > 0.0)),
            annual_production_kwh: self.estimated_annual_production_kwh,
            system_cost: self.system_cost,
            annual_savings: self.annual_savings,
            lifetime_savings: self.lifetime_savings,
            break_even_years: self.break_even_years,
            co2_offset_tons: self.co2_offset_tons,
            ..SourceRecord::default()
        }
    }
}

/// Location passed explicitly with the request.
impl DataSource for Coordinates {
    fn name(&self) -> &'static str {
        "query"
    }

    fn record(&self) -> SourceRecord {
        SourceRecord { location: Some(*self), ..SourceRecord::default() }
    }
}

impl DataSource for PropertyRecord {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn record(&self) -> SourceRecord {
        SourceRecord {
            location: self.coordinates,
            tilt_deg: self.roof_angle_deg,
            monthly_consumption_kwh: self.monthly_consumption_kwh,
            ..SourceRecord::default()
        }
    }
}

impl DataSource for ActiveSystemRecord {
    fn name(&self) -> &'static str {
        "system"
    }

    fn record(&self) -> SourceRecord {
        SourceRecord {
            capacity_kw: self.capacity_kw,
            panel_count: self.panel_count,
            panel_model: self.panel_model.clone(),
            installed_date: self.installed_date,
            ..SourceRecord::default()
        }
    }
}

// ─── Source chain ────────────────────────────────────────────

/// Ordered list of named sources with a single first-non-null resolver.
#[derive(Debug, Clone, Default)]
pub struct SourceChain {
    sources: Vec<(&'static str, SourceRecord)>,
    provenance: BTreeMap<String, String>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Option<&dyn DataSource>) -> Self {
        if let Some(s) = source {
            self.sources.push((s.name(), s.record()));
        }
        self
    }

    /// Design > query > profile > active system.
    pub fn from_request(req: &DashboardRequest) -> Self {
        Self::new()
            .with_source(req.design.as_ref().map(|d| d as &dyn DataSource))
            .with_source(req.query.as_ref().map(|q| q as &dyn DataSource))
            .with_source(req.property.as_ref().map(|p| p as &dyn DataSource))
            .with_source(req.active_system.as_ref().map(|s| s as &dyn DataSource))
    }

    pub fn resolve<T>(&mut self, field: &str, pick: impl Fn(&SourceRecord) -> Option<T>) -> Option<T> {
        for (name, record) in &self.sources {
            if let Some(value) = pick(record) {
                self.provenance.insert(field.to_owned(), (*name).to_owned());
                return Some(value);
            }
        }
        None
    }

    pub fn resolve_or<T>(&mut self, field: &str, pick: impl Fn(&SourceRecord) -> Option<T>, default: T) -> T {
        match self.resolve(field, pick) {
            Some(v) => v,
            None => self.fallback(field, DEFAULT_SOURCE, default),
        }
    }

    pub fn resolve_or_derive<T>(
        &mut self,
        field: &str,
        pick: impl Fn(&SourceRecord) -> Option<T>,
        derive: impl FnOnce() -> T,
    ) -> T {
        match self.resolve(field, pick) {
            Some(v) => v,
            None => self.fallback(field, DERIVED_SOURCE, derive()),
        }
    }

    pub fn note(&mut self, field: &str, source: &str) {
        self.provenance.insert(field.to_owned(), source.to_owned());
    }

    fn fallback<T>(&mut self, field: &str, source: &str, value: T) -> T {
        self.note(field, source);
        value
    }

    pub fn provenance(&self) -> &BTreeMap<String, String> {
        &self.provenance
    }

    pub fn into_provenance(self) -> BTreeMap<String, String> {
        self.provenance
    }
}

fn data_source_label(req: &DashboardRequest) -> &'static str {
    if req.design.is_some() {
        "design"
    } else if req.active_system.is_some() {
        "system"
    } else {
        DEFAULT_SOURCE
    }
}

// ─── Snapshot ────────────────────────────────────────────────

/// Build the dashboard summary for `req` as seen at `now`.
pub fn build_snapshot(req: &DashboardRequest, settings: &EngineSettings, now: NaiveDateTime) -> Result<DashboardSnapshot> {
    let defaults = &settings.defaults;
    let today = now.date();
    let mut chain = SourceChain::from_request(req);

    // Site & hardware
    let coords = chain.resolve_or(
        "location",
        |r| r.location,
        Coordinates { lat: defaults.reference_latitude, lng: defaults.reference_longitude },
    );
    let location = SiteLocation::new(coords.lat, coords.lng)?;
    let lat = location.latitude();

    let capacity_kw = chain.resolve_or("capacityKw", |r| r.capacity_kw, defaults.capacity_kw);

    let panel_count = chain.resolve_or_derive("panelCount", |r| r.panel_count, || {
        ((capacity_kw / defaults.panel_kw).round() as u32).max(1)
    });
    let panel_wattage_w = match chain.resolve("panelWattageW", |r| r.panel_wattage_w) {
        Some(w) => w,
        None if panel_count > 0 => {
            chain.note("panelWattageW", DERIVED_SOURCE);
            (capacity_kw * 1000.0 / f64::from(panel_count)).round()
        }
        None => {
            chain.note("panelWattageW", DEFAULT_SOURCE);
            defaults.panel_wattage_w
        }
    };
    let panel_model = chain.resolve_or_derive("panelModel", |r| r.panel_model.clone(), || {
        format!("Standard {panel_wattage_w}W")
    });
    let tilt_deg = chain.resolve_or_derive("tiltDeg", |r| r.tilt_deg, || (lat.abs() * 0.9).round());
    let azimuth_deg = chain.resolve_or_derive("azimuthDeg", |r| r.azimuth_deg, || {
        if lat >= 0.0 { 180.0 } else { 0.0 }
    });

    // Losses, age & soiling
    let system = SystemConfig {
        capacity_kw,
        panel_count,
        panel_wattage_w,
        tilt_deg,
        azimuth_deg,
        system_loss_fraction: chain.resolve_or("systemLossFraction", |r| r.system_loss_fraction, defaults.system_loss_fraction),
        shadow_loss_fraction: chain.resolve_or("shadowLossFraction", |r| r.shadow_loss_fraction, 0.0),
        installed_date: chain.resolve("installedDate", |r| r.installed_date),
    };
    system.validate()?;
    let system_loss = system.system_loss_fraction;
    let shadow_loss = system.shadow_loss_fraction;

    let years_active = match system.years_active(today) {
        Some(years) => years,
        None => chain.fallback("installedDate", DEFAULT_SOURCE, defaults.years_active),
    };
    let degradation = degradation_factor(defaults.panel_degradation_pct, years_active);

    let soiling = SoilingState::from_last_cleaning(req.last_cleaning, now, defaults.days_since_clean);
    chain.note(
        "daysSinceClean",
        if req.last_cleaning.is_some() { CLEANING_LOG_SOURCE } else { DEFAULT_SOURCE },
    );
    let days_since_clean = soiling.days_since_clean;
    let soiling_loss = settings.soiling.loss_fraction(soiling);

    let losses = LossProfile::new(system_loss, shadow_loss, soiling_loss)?;
    let total_loss = losses.total_fraction();

    // Production
    let mut simulator = ProductionSimulator::new(lat, capacity_kw * degradation, total_loss)?;
    match chain.resolve("monthlyPsh", |r| r.monthly_psh) {
        Some(psh) => simulator = simulator.with_monthly_psh(psh),
        None => chain.note("monthlyPsh", DERIVED_SOURCE),
    }

    let region = resolve_with_override(&location, req.region_override.as_ref())?;
    let rate = region.electricity_rate;

    let today_estimate = simulator.today_estimate(now);
    let breakdown = simulator.yearly_production_breakdown();
    let internal_total: f64 = breakdown.iter().map(|p| p.produced_kwh).sum();

    let external = chain.resolve("annualProductionKwh", |r| r.annual_production_kwh);
    let condition = condition_factor(degradation, soiling_loss, system_loss, shadow_loss);
    let reconciled = reconcile_annual_estimate(internal_total, external, condition, &settings.sanity_band);
    let monthly_breakdown = apply_reconciliation(&breakdown, &reconciled);
    let yearly_total: f64 = monthly_breakdown.iter().map(|p| p.produced_kwh).sum();
    let monthly_total = monthly_breakdown[today.month0() as usize].produced_kwh;

    debug!(
        internal_total,
        yearly_total,
        source = ?reconciled.source,
        capacity_kw,
        total_loss,
        "dashboard production resolved"
    );

    // Money
    let monthly_savings = (monthly_total * rate).round();
    let lifetime_savings = chain.resolve_or_derive("lifetimeSavings", |r| r.lifetime_savings, || {
        (monthly_savings * (years_active * 12.0).max(1.0)).round()
    });
    let system_cost = chain.resolve_or_derive("systemCost", |r| r.system_cost, || {
        capacity_kw * region.install_cost_per_kw
    });
    let annual_savings = chain.resolve_or_derive("annualSavings", |r| r.annual_savings, || monthly_savings * 12.0);
    let break_even_years = chain.resolve_or_derive("breakEvenYears", |r| r.break_even_years, || {
        if annual_savings > 0.0 { system_cost / annual_savings } else { NO_BREAK_EVEN_YEARS }
    });
    let break_even_progress_pct = if break_even_years > 0.0 {
        round_dp(years_active / break_even_years * 100.0, 1).min(100.0)
    } else {
        100.0
    };

    let consumption = chain.resolve("monthlyConsumptionKwh", |r| r.monthly_consumption_kwh);
    let distribution = energy_split(monthly_total, consumption, days_since_clean, settings.overlap_factor);

    // Environment
    let co2_per_year = yearly_total * region.co2_factor_kg_per_kwh / 1000.0;
    let total_co2 = chain.resolve_or_derive("co2OffsetTons", |r| r.co2_offset_tons, || {
        co2_per_year * years_active.max(1.0)
    });

    let next_cleaning_date = today + Duration::days((CLEANING_INTERVAL_DAYS - i64::from(days_since_clean)).max(1));
    let city = req
        .property
        .as_ref()
        .and_then(|p| p.city.clone())
        .unwrap_or_else(|| "Unknown".to_owned());

    Ok(DashboardSnapshot {
        energy: EnergyBlock {
            today_so_far: today_estimate.today_so_far,
            today_estimate: today_estimate.full_day_estimate,
            current_psh: today_estimate.current_psh,
            monthly_total,
            yearly_total,
            daily_avg: round_dp(yearly_total / 365.0, 1),
            capacity_kw,
            estimate_source: reconciled.source,
            weekly_data: simulator.weekly_production_data(today, rate),
            hourly_today: simulator.today_hourly_curve(today),
            monthly_breakdown,
        },
        financial: FinancialBlock {
            monthly_savings,
            annual_savings,
            lifetime_savings,
            system_cost,
            break_even_years: round_dp(break_even_years, 1),
            break_even_progress_pct,
            electricity_rate: rate,
            currency_code: region.currency_code.clone(),
            country_label: region.country_label.clone(),
        },
        distribution,
        system_health: SystemHealth {
            efficiency_pct: round_dp((1.0 - total_loss) * degradation * 100.0, 1),
            dust_level: dust_label(days_since_clean),
            days_since_clean,
            next_cleaning_date,
            panel_count: system.panel_count,
            panel_wattage_w: system.panel_wattage_w,
            panel_model,
            tilt_deg: system.tilt_deg,
            azimuth_deg: system.azimuth_deg,
            soiling_loss_pct: round_dp(soiling_loss * 100.0, 1),
            shadow_loss_pct: round_dp(shadow_loss * 100.0, 1),
            degradation_pct: round_dp((1.0 - degradation) * 100.0, 1),
            system_losses_pct: (system_loss * 100.0).round(),
        },
        environmental: EnvironmentalBlock {
            co2_offset_tons: round_dp(total_co2, 2),
            co2_per_year_tons: round_dp(co2_per_year, 2),
            trees_equivalent: (total_co2 * TREES_PER_TON_CO2).round() as u64,
            miles_not_driven: (total_co2 * MILES_PER_TON_CO2).round() as u64,
        },
        location: LocationBlock {
            lat,
            lng: location.longitude(),
            city,
            country_label: region.country_label,
        },
        data_source: data_source_label(req).to_owned(),
        provenance: chain.into_provenance(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::services::production::EstimateSource;
    use crate::services::soiling::Urgency;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 16).unwrap().and_hms_opt(13, 0, 0).unwrap()
    }

    fn snapshot(req: &DashboardRequest) -> DashboardSnapshot {
        build_snapshot(req, &EngineSettings::default(), now()).unwrap()
    }

    fn karachi_design() -> DesignRecord {
        DesignRecord {
            location: Some(Coordinates { lat: 24.86, lng: 67.01 }),
            total_capacity_kw: Some(6.6),
            ..DesignRecord::default()
        }
    }

    #[test]
    fn test_empty_request_falls_back_to_defaults() {
        let s = snapshot(&DashboardRequest::default());
        assert_eq!(s.data_source, "default");
        assert_eq!(s.location.lat, 28.6139);
        assert_eq!(s.energy.capacity_kw, 5.0);
        assert_eq!(s.system_health.days_since_clean, 30);
        assert_eq!(s.system_health.panel_count, 13);
        assert_eq!(s.system_health.panel_wattage_w, 385.0);
        assert_eq!(s.system_health.azimuth_deg, 180.0);
        assert_eq!(s.system_health.system_losses_pct, 15.0);
        assert_eq!(s.location.city, "Unknown");
        assert_eq!(s.provenance["location"], "default");
        assert_eq!(s.provenance["panelCount"], "derived");
        assert_eq!(s.provenance["daysSinceClean"], "default");
    }

    #[test]
    fn test_design_beats_query_beats_profile() {
        let query = Coordinates { lat: 31.52, lng: 74.35 };
        let property = PropertyRecord {
            city: Some("Lahore".to_owned()),
            coordinates: Some(Coordinates { lat: 33.7, lng: 73.0 }),
            roof_angle_deg: Some(20.0),
            ..PropertyRecord::default()
        };

        let with_design = snapshot(&DashboardRequest {
            design: Some(karachi_design()),
            query: Some(query),
            property: Some(property.clone()),
            ..DashboardRequest::default()
        });
        assert_eq!(with_design.location.lat, 24.86);
        assert_eq!(with_design.provenance["location"], "design");
        // design has no tilt, profile roof angle is next
        assert_eq!(with_design.system_health.tilt_deg, 20.0);
        assert_eq!(with_design.provenance["tiltDeg"], "profile");
        assert_eq!(with_design.location.city, "Lahore");

        let without_design = snapshot(&DashboardRequest {
            query: Some(query),
            property: Some(property.clone()),
            ..DashboardRequest::default()
        });
        assert_eq!(without_design.location.lat, 31.52);
        assert_eq!(without_design.provenance["location"], "query");

        let profile_only = snapshot(&DashboardRequest { property: Some(property), ..DashboardRequest::default() });
        assert_eq!(profile_only.location.lat, 33.7);
        assert_eq!(profile_only.provenance["location"], "profile");
    }

    #[test]
    fn test_design_capacity_beats_active_system() {
        let system = ActiveSystemRecord {
            capacity_kw: Some(3.0),
            panel_count: Some(8),
            panel_model: Some("Mono 375".to_owned()),
            installed_date: NaiveDate::from_ymd_opt(2023, 4, 16),
        };

        let s = snapshot(&DashboardRequest {
            design: Some(karachi_design()),
            active_system: Some(system.clone()),
            ..DashboardRequest::default()
        });
        assert_eq!(s.data_source, "design");
        assert_eq!(s.energy.capacity_kw, 6.6);
        // design has no panel count, system has
        assert_eq!(s.system_health.panel_count, 8);
        assert_eq!(s.provenance["panelCount"], "system");
        assert_eq!(s.system_health.panel_model, "Mono 375");

        let s = snapshot(&DashboardRequest { active_system: Some(system), ..DashboardRequest::default() });
        assert_eq!(s.data_source, "system");
        assert_eq!(s.energy.capacity_kw, 3.0);
        assert_eq!(s.provenance["installedDate"], "system");
        // two years of compounding degradation
        assert!((s.system_health.degradation_pct - 1.0).abs() <= 0.1);
    }

    #[test]
    fn test_energy_figures_agree() {
        let s = snapshot(&DashboardRequest { design: Some(karachi_design()), ..DashboardRequest::default() });
        let e = &s.energy;
        let sum: f64 = e.monthly_breakdown.iter().map(|p| p.produced_kwh).sum();
        assert_eq!(e.yearly_total, sum);
        assert_eq!(e.monthly_total, e.monthly_breakdown[3].produced_kwh);
        assert_eq!(e.daily_avg, round_dp(e.yearly_total / 365.0, 1));
        assert!(e.today_so_far > 0.0 && e.today_so_far < e.today_estimate);
        assert_eq!(e.weekly_data.len(), 7);
        assert_eq!(s.financial.currency_code, "PKR");
        assert_eq!(s.financial.monthly_savings, (e.monthly_total * 55.0).round());
        for p in &e.monthly_breakdown {
            assert_eq!(p.exported_kwh, (p.produced_kwh - p.consumed_kwh).max(0.0));
        }
        let d = s.distribution;
        assert_eq!(d.self_consumed_pct + d.exported_pct + d.grid_import_pct, 100);
    }

    #[test]
    fn test_external_estimate_inside_band_is_adopted() {
        let physics = snapshot(&DashboardRequest { design: Some(karachi_design()), ..DashboardRequest::default() });
        let internal = physics.energy.yearly_total;
        assert_eq!(physics.energy.estimate_source, EstimateSource::Physics);

        let design = DesignRecord {
            estimated_annual_production_kwh: Some(internal * 1.3),
            ..karachi_design()
        };
        let adopted = snapshot(&DashboardRequest { design: Some(design), ..DashboardRequest::default() });
        assert_eq!(adopted.energy.estimate_source, EstimateSource::External);
        assert!((adopted.energy.yearly_total - (internal * 1.3).round()).abs() <= 12.0);

        let design = DesignRecord {
            estimated_annual_production_kwh: Some(internal * 3.0),
            ..karachi_design()
        };
        let rejected = snapshot(&DashboardRequest { design: Some(design), ..DashboardRequest::default() });
        assert_eq!(rejected.energy.estimate_source, EstimateSource::Physics);
        assert_eq!(rejected.energy.yearly_total, internal);
    }

    #[test]
    fn test_design_irradiance_replaces_geometry() {
        let design = DesignRecord { monthly_psh: Some(vec![6.25; 12]), ..karachi_design() };
        let s = snapshot(&DashboardRequest { design: Some(design), ..DashboardRequest::default() });
        assert_eq!(s.energy.current_psh, 6.25);
        assert_eq!(s.provenance["monthlyPsh"], "design");

        // anything but twelve values is ignored
        let design = DesignRecord { monthly_psh: Some(vec![6.25; 11]), ..karachi_design() };
        let s = snapshot(&DashboardRequest { design: Some(design), ..DashboardRequest::default() });
        assert_eq!(s.provenance["monthlyPsh"], "derived");
    }

    #[test]
    fn test_recent_cleaning_lowers_dust() {
        let s = snapshot(&DashboardRequest {
            last_cleaning: Some(now() - Duration::days(5)),
            ..DashboardRequest::default()
        });
        assert_eq!(s.system_health.days_since_clean, 5);
        assert_eq!(s.system_health.dust_level, Urgency::Low);
        assert_eq!(s.provenance["daysSinceClean"], "cleaningLog");
        assert_eq!(s.system_health.next_cleaning_date, now().date() + Duration::days(25));

        let dirty = snapshot(&DashboardRequest::default());
        assert_eq!(dirty.system_health.dust_level, Urgency::High);
        assert_eq!(dirty.system_health.next_cleaning_date, now().date() + Duration::days(1));
        assert!(dirty.system_health.efficiency_pct < s.system_health.efficiency_pct);
    }

    #[test]
    fn test_household_consumption_drives_split() {
        let property = PropertyRecord { monthly_consumption_kwh: Some(400.0), ..PropertyRecord::default() };
        let s = snapshot(&DashboardRequest { property: Some(property), ..DashboardRequest::default() });
        let d = s.distribution;
        assert_eq!(d.self_consumed_pct + d.exported_pct + d.grid_import_pct, 100);
        assert_eq!(s.provenance["monthlyConsumptionKwh"], "profile");
    }

    #[test]
    fn test_invalid_design_location_is_an_error() {
        let design = DesignRecord {
            location: Some(Coordinates { lat: 123.0, lng: 0.0 }),
            ..DesignRecord::default()
        };
        let err = build_snapshot(
            &DashboardRequest { design: Some(design), ..DashboardRequest::default() },
            &EngineSettings::default(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCoordinate { axis: "latitude", .. }));
    }

    #[test]
    fn test_stored_hardware_is_validated() {
        let lossy = DesignRecord { system_losses_pct: Some(100.0), ..karachi_design() };
        let err = build_snapshot(
            &DashboardRequest { design: Some(lossy), ..DashboardRequest::default() },
            &EngineSettings::default(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidLossFraction { name: "systemLossFraction", .. }));

        let empty = ActiveSystemRecord { capacity_kw: Some(0.0), ..ActiveSystemRecord::default() };
        let err = build_snapshot(
            &DashboardRequest { active_system: Some(empty), ..DashboardRequest::default() },
            &EngineSettings::default(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCapacity(_)));
    }

    #[test]
    fn test_install_date_in_future_counts_as_new() {
        let system = ActiveSystemRecord {
            installed_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..ActiveSystemRecord::default()
        };
        let s = snapshot(&DashboardRequest { active_system: Some(system), ..DashboardRequest::default() });
        assert_eq!(s.provenance["installedDate"], "system");
        assert_eq!(s.system_health.degradation_pct, 0.0);
    }
}
