//! Engine configuration
//!
//! YAML description of a price list and search options:
//!
//! ```yaml
//! unit_price: "8.00 EUR"
//! catalog: "ABCDE"
//! discounts: ["0%", "0%", "5%", "10%", "20%", "25%"]
//! search:
//!   strategy: threshold
//!   prune_below: 4
//! ```

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError},
    discounts::{DiscountError, DiscountTable},
    groups::PruneRule,
    optimizer::{PricingEngine, SearchOptions},
    pricing::{PriceList, PricingError},
    solvers::{SearchLimits, Strategy},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Discount table rejected
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Price list rejected
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Basket does not fit the catalog
    #[error(transparent)]
    Basket(#[from] BasketError),
}

/// Search section of the configuration.
///
/// Omitted fields match [`SearchOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Search strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// Drop groups smaller than this once one this large can be formed.
    /// Missing uses the default of 4; an explicit `null` disables pruning.
    #[serde(default = "default_prune_below")]
    pub prune_below: Option<usize>,

    /// Maximum row selections per search
    #[serde(default)]
    pub max_steps: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            strategy: Strategy::default(),
            prune_below: default_prune_below(),
            max_steps: None,
        }
    }
}

fn default_prune_below() -> Option<usize> {
    match PruneRule::default() {
        PruneRule::BelowSize(size) => Some(size),
        PruneRule::None => None,
    }
}

impl SearchConfig {
    /// Search options described by this section.
    pub fn options(&self) -> SearchOptions {
        let prune = self.prune_below.map_or(PruneRule::None, PruneRule::BelowSize);

        SearchOptions::default()
            .with_strategy(self.strategy)
            .with_prune(prune)
            .with_limits(SearchLimits {
                max_steps: self.max_steps,
            })
    }
}

/// Engine configuration as read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Unit price (e.g., "8.00 EUR")
    pub unit_price: String,

    /// Permitted kinds; empty accepts anything
    #[serde(default)]
    pub catalog: String,

    /// Discount tiers by distinct-kind count ("5%" or "0.05"); missing uses
    /// the reference table
    #[serde(default)]
    pub discounts: Option<Vec<String>>,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Parse a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document doesn't match the schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Build the price list.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit price, a discount tier, or the resulting
    /// table is invalid.
    pub fn price_list(&self) -> Result<PriceList, ConfigError> {
        let (unit_price, currency) = parse_price(&self.unit_price)?;

        let discounts = match &self.discounts {
            Some(tiers) => DiscountTable::new(
                tiers
                    .iter()
                    .map(String::as_str)
                    .map(parse_percentage)
                    .collect::<Result<Vec<_>, _>>()?,
            )?,
            None => DiscountTable::reference(),
        };

        Ok(PriceList::new(unit_price, currency, discounts)?)
    }

    /// Build a pricing engine.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::price_list`].
    pub fn engine(&self) -> Result<PricingEngine, ConfigError> {
        Ok(PricingEngine::with_options(
            self.price_list()?,
            self.search.options(),
        ))
    }

    /// Permitted kinds, in catalog order.
    pub fn catalog(&self) -> Vec<char> {
        self.catalog.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Parse a basket, validating it against the catalog when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Basket`] if a kind is not in the catalog.
    pub fn parse_basket(&self, input: &str) -> Result<Basket, ConfigError> {
        let catalog = self.catalog();

        if catalog.is_empty() {
            return Ok(Basket::parse(input));
        }

        Ok(Basket::parse_with_catalog(input, &catalog)?)
    }
}

/// Parse price string (e.g., "8.00 EUR") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), ConfigError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    let currency = match code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(ConfigError::UnknownCurrency(other.to_string())),
    };

    Ok((amount, currency))
}

/// Parse percentage string (e.g., "5%" or "0.05") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string is not a decimal number, with or without a
/// trailing `%`.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let fraction = if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map(|points| points / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    }
    .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(fraction))
}
