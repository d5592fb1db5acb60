use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::services::engine::{EngineDefaults, EngineSettings};
use crate::services::production::{DEFAULT_OVERLAP_FACTOR, SanityBand};
use crate::services::soiling::SoilingModel;
use crate::services::validate_horizon;

pub const CONFIG_PATH_ENV: &str = "SOLAR_ENGINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_port() -> u16 { 8080 }
fn default_bind_address() -> String { "0.0.0.0".to_owned() }
fn default_overlap_factor() -> f64 { DEFAULT_OVERLAP_FACTOR }
fn default_discount_rate() -> f64 { 0.10 }
fn default_horizon_years() -> u32 { 25 }
fn default_cleaning_cost() -> f64 { 2_000.0 }

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineDefaults,
    #[serde(default)]
    pub soiling: SoilingModel,
    #[serde(default)]
    pub reconciliation: SanityBand,
    #[serde(default)]
    pub self_consumption: SelfConsumptionConfig,
    #[serde(default)]
    pub finance: FinanceConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), bind_address: default_bind_address() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SelfConsumptionConfig {
    /// Share of household demand falling in production hours
    #[serde(default = "default_overlap_factor")]
    pub overlap_factor: f64,
}

impl Default for SelfConsumptionConfig {
    fn default() -> Self {
        Self { overlap_factor: default_overlap_factor() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FinanceConfig {
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self { discount_rate: default_discount_rate(), horizon_years: default_horizon_years() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MaintenanceConfig {
    /// Cost of one professional cleaning, in the site's currency
    #[serde(default = "default_cleaning_cost")]
    pub cleaning_cost: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { cleaning_cost: default_cleaning_cost() }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$SOLAR_ENGINE_CONFIG` or `config.json`. A missing file is not
    /// an error: the built-in defaults are used instead.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(%path, "config file not found, using built-in defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.soiling.validate().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let band = &self.reconciliation;
        if !(band.lower_ratio > 0.0 && band.lower_ratio < band.upper_ratio) {
            return Err(ConfigError::Invalid(format!(
                "reconciliation band [{}, {}] must satisfy 0 < lower < upper",
                band.lower_ratio, band.upper_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.self_consumption.overlap_factor) {
            return Err(ConfigError::Invalid(format!(
                "self_consumption.overlap_factor {} is not within [0, 1]",
                self.self_consumption.overlap_factor
            )));
        }
        validate_horizon(self.finance.horizon_years)
            .map_err(|e| ConfigError::Invalid(format!("finance.horizon_years: {e}")))?;
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            defaults: self.engine.clone(),
            soiling: self.soiling,
            sanity_band: self.reconciliation,
            overlap_factor: self.self_consumption.overlap_factor,
            discount_rate: self.finance.discount_rate,
            horizon_years: self.finance.horizon_years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine_settings(), EngineSettings::default());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": {"port": 3000},
                "soiling": {"ratePctPerDay": 0.5},
                "reconciliation": {"upperRatio": 1.5}
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.soiling.rate_pct_per_day, 0.5);
        assert_eq!(config.soiling.max_loss_pct, 40.0);
        assert_eq!(config.reconciliation.upper_ratio, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_band() {
        let mut config = Config::default();
        config.reconciliation = SanityBand { lower_ratio: 2.0, upper_ratio: 0.5 };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unbounded_horizon() {
        let mut config = Config::default();
        config.finance.horizon_years = 500;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/solar-config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
