//! Pricing configuration.
//!
//! Tariff parameters are an explicit immutable struct rather than scattered
//! module-level constants, so alternative tariffs can be loaded from YAML
//! without any hidden global state.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::{Findable, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

/// Errors loading or resolving pricing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file.
    #[error("failed to read pricing config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse pricing config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Immutable pricing parameters for the trip pricing engine.
///
/// [`PricingConfig::default`] reproduces the production tariff: distance-based
/// trips are capped at 10 miles with a $10 deposit and $25 service fee,
/// hourly services bill at $30/hour, flat-rate services at $25, and the
/// company keeps a $7 commission out of every service fee.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingConfig {
    max_distance_miles: Decimal,
    distance_deposit: Decimal,
    distance_service_fee: Decimal,
    company_fee: Decimal,
    hourly_rate: Decimal,
    flat_service_fee: Decimal,
    currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_distance_miles: Decimal::from(10),
            distance_deposit: Decimal::from(10),
            distance_service_fee: Decimal::from(25),
            company_fee: Decimal::from(7),
            hourly_rate: Decimal::from(30),
            flat_service_fee: Decimal::from(25),
            currency: "USD".to_owned(),
        }
    }
}

impl PricingConfig {
    /// Parses a configuration from a YAML document.
    ///
    /// Missing fields fall back to the defaults, so a partial document only
    /// overriding, say, `hourlyRate` is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document cannot be parsed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it cannot be parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Maximum one-way distance, in miles, a distance-based trip may cover.
    ///
    /// Exposed so callers never hard-code the cap.
    pub fn max_distance_miles(&self) -> Decimal {
        self.max_distance_miles
    }

    /// Deposit charged for a distance-based trip.
    pub fn distance_deposit(&self) -> Decimal {
        self.distance_deposit
    }

    /// Service fee charged for a distance-based trip.
    pub fn distance_service_fee(&self) -> Decimal {
        self.distance_service_fee
    }

    /// Company commission deducted from every service fee.
    pub fn company_fee(&self) -> Decimal {
        self.company_fee
    }

    /// Hourly rate for hourly service categories.
    pub fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }

    /// Service fee for flat-rate service categories.
    pub fn flat_service_fee(&self) -> Decimal {
        self.flat_service_fee
    }

    /// ISO alpha code of the billing currency.
    pub fn currency_code(&self) -> &str {
        &self.currency
    }

    /// Resolves the billing currency against the ISO currency table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the configured code is not
    /// a known ISO currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Currency::find(&self.currency)
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }
}
