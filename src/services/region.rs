//! Regional tariff, currency and grid-emission lookup.
//!
//! Regions are axis-aligned bounding boxes evaluated in table order; the first
//! box containing the point wins, so overlapping boxes resolve by position in
//! [`REGIONS`], never by distance.

use crate::error::Result;
use crate::models::site::{RegionFactors, SiteLocation};

#[derive(Debug, Clone, Copy)]
pub struct RegionEntry {
    pub country: &'static str,
    /// Inclusive (south, north) bounds
    pub lat: (f64, f64),
    /// Inclusive (west, east) bounds
    pub lng: (f64, f64),
    pub electricity_rate: f64,
    pub currency: &'static str,
    pub co2_factor: f64,
    pub install_cost_per_kw: f64,
}

impl RegionEntry {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.lat.0..=self.lat.1).contains(&lat) && (self.lng.0..=self.lng.1).contains(&lng)
    }

    pub fn factors(&self) -> RegionFactors {
        RegionFactors {
            electricity_rate: self.electricity_rate,
            currency_code: self.currency.to_owned(),
            co2_factor_kg_per_kwh: self.co2_factor,
            country_label: self.country.to_owned(),
            install_cost_per_kw: self.install_cost_per_kw,
        }
    }
}

pub const REGIONS: [RegionEntry; 5] = [
    RegionEntry {
        country: "Pakistan",
        lat: (23.0, 37.0),
        lng: (60.0, 78.0),
        electricity_rate: 55.0,
        currency: "PKR",
        co2_factor: 0.38,
        install_cost_per_kw: 150_000.0,
    },
    RegionEntry {
        country: "India",
        lat: (8.0, 35.0),
        lng: (68.0, 97.0),
        electricity_rate: 8.0,
        currency: "INR",
        co2_factor: 0.82,
        install_cost_per_kw: 50_000.0,
    },
    RegionEntry {
        country: "UAE",
        lat: (20.0, 30.0),
        lng: (50.0, 60.0),
        electricity_rate: 0.35,
        currency: "AED",
        co2_factor: 0.45,
        install_cost_per_kw: 3_500.0,
    },
    RegionEntry {
        country: "Europe",
        lat: (35.0, 65.0),
        lng: (-10.0, 40.0),
        electricity_rate: 0.30,
        currency: "EUR",
        co2_factor: 0.30,
        install_cost_per_kw: 1_200.0,
    },
    RegionEntry {
        country: "USA",
        lat: (25.0, 50.0),
        lng: (-130.0, -60.0),
        electricity_rate: 0.15,
        currency: "USD",
        co2_factor: 0.42,
        install_cost_per_kw: 1_000.0,
    },
];

pub const FALLBACK_REGION: RegionEntry = RegionEntry {
    country: "Unknown",
    lat: (-90.0, 90.0),
    lng: (-180.0, 180.0),
    electricity_rate: 55.0,
    currency: "PKR",
    co2_factor: 0.5,
    install_cost_per_kw: 150_000.0,
};

/// Resolve the tariff region for a site. Always returns a value.
pub fn resolve_region(location: &SiteLocation) -> RegionFactors {
    resolve_in(&REGIONS, location.latitude(), location.longitude())
}

/// First-match lookup over an arbitrary ordered table.
pub fn resolve_in(table: &[RegionEntry], lat: f64, lng: f64) -> RegionFactors {
    table
        .iter()
        .find(|r| r.contains(lat, lng))
        .unwrap_or(&FALLBACK_REGION)
        .factors()
}

/// An explicit override wins over the bounding-box lookup, once it has
/// passed validation.
pub fn resolve_with_override(location: &SiteLocation, region_override: Option<&RegionFactors>) -> Result<RegionFactors> {
    match region_override {
        Some(r) => {
            r.validate()?;
            Ok(r.clone())
        }
        None => Ok(resolve_region(location)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64) -> RegionFactors {
        resolve_region(&SiteLocation::new(lat, lng).unwrap())
    }

    #[test]
    fn test_known_regions() {
        assert_eq!(at(24.91, 67.03).country_label, "Pakistan");
        assert_eq!(at(19.07, 72.88).currency_code, "INR");
        assert_eq!(at(25.2, 55.27).currency_code, "AED");
        assert_eq!(at(48.85, 2.35).currency_code, "EUR");
        assert_eq!(at(40.71, -74.0).currency_code, "USD");
    }

    #[test]
    fn test_overlap_resolves_by_table_order() {
        // Inside both the Pakistan and India boxes
        let r = at(30.0, 75.0);
        assert_eq!(r.country_label, "Pakistan");
        assert_eq!(r.electricity_rate, 55.0);

        // Same point with India moved first
        let swapped = [REGIONS[1], REGIONS[0]];
        assert_eq!(resolve_in(&swapped, 30.0, 75.0).country_label, "India");
    }

    #[test]
    fn test_fallback_region() {
        let r = at(-33.9, 151.2);
        assert_eq!(r.country_label, "Unknown");
        assert_eq!(r.co2_factor_kg_per_kwh, 0.5);
    }

    #[test]
    fn test_box_edges_are_inclusive() {
        assert_eq!(at(37.0, 60.0).country_label, "Pakistan");
        assert_eq!(at(65.0, 40.0).country_label, "Europe");
    }

    #[test]
    fn test_override_wins() {
        let loc = SiteLocation::new(24.91, 67.03).unwrap();
        let custom = RegionFactors {
            electricity_rate: 0.2,
            currency_code: "GBP".to_owned(),
            co2_factor_kg_per_kwh: 0.2,
            country_label: "UK".to_owned(),
            install_cost_per_kw: 1_500.0,
        };
        assert_eq!(resolve_with_override(&loc, Some(&custom)).unwrap(), custom);
        assert_eq!(resolve_with_override(&loc, None).unwrap().country_label, "Pakistan");
    }

    #[test]
    fn test_override_with_bad_factors_rejected() {
        let loc = SiteLocation::new(24.91, 67.03).unwrap();
        let base = RegionFactors {
            electricity_rate: 0.2,
            currency_code: "GBP".to_owned(),
            co2_factor_kg_per_kwh: 0.2,
            country_label: "UK".to_owned(),
            install_cost_per_kw: 1_500.0,
        };
        let bad = [
            RegionFactors { electricity_rate: -0.2, ..base.clone() },
            RegionFactors { electricity_rate: f64::NAN, ..base.clone() },
            RegionFactors { co2_factor_kg_per_kwh: f64::INFINITY, ..base.clone() },
            RegionFactors { install_cost_per_kw: -1.0, ..base },
        ];
        for r in &bad {
            assert!(resolve_with_override(&loc, Some(r)).is_err(), "accepted {r:?}");
        }
    }
}
