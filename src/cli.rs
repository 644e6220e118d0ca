//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::{
    basket::Basket,
    config::{ConfigError, EngineConfig},
    groups::PruneRule,
    optimizer::{PricingEngine, SearchOptions},
    pricing::PriceList,
    solvers::{SearchLimits, Strategy},
};

/// Arguments for the pricing demo
#[derive(Debug, Parser)]
#[command(about = "Price a basket with volume discounts on distinct kinds")]
pub struct PriceArgs {
    /// Basket contents, one character per item (e.g. "AABBCCDE")
    pub basket: String,

    /// YAML engine configuration; the reference price list is used otherwise
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Search strategy, overriding the configuration
    #[clap(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Keep every group size while building the cover matrix
    #[clap(long)]
    pub no_prune: bool,

    /// Maximum row selections in the exact-cover search
    #[clap(long)]
    pub max_steps: Option<u64>,
}

impl PriceArgs {
    /// Build the engine and basket described by these arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the basket
    /// contains kinds outside the configured catalog.
    pub fn engine_and_basket(&self) -> Result<(PricingEngine, Basket), ConfigError> {
        let (prices, options, basket) = match &self.config {
            Some(path) => {
                let config = EngineConfig::load(path)?;

                (
                    config.price_list()?,
                    config.search.options(),
                    config.parse_basket(&self.basket)?,
                )
            }
            None => (
                PriceList::reference(),
                SearchOptions::default(),
                Basket::parse(&self.basket),
            ),
        };

        Ok((PricingEngine::with_options(prices, self.apply(options)), basket))
    }

    fn apply(&self, mut options: SearchOptions) -> SearchOptions {
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }

        if self.no_prune {
            options.prune = PruneRule::None;
        }

        if let Some(max_steps) = self.max_steps {
            options.limits = SearchLimits::with_max_steps(max_steps);
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_to_reference_engine() -> TestResult {
        let args = PriceArgs::try_parse_from(["price", "AABBCCDE"])?;

        let (engine, basket) = args.engine_and_basket()?;

        assert_eq!(engine, PricingEngine::reference());
        assert_eq!(basket.len(), 8);

        Ok(())
    }

    #[test]
    fn flags_override_search_options() -> TestResult {
        let args = PriceArgs::try_parse_from([
            "price",
            "ABC",
            "--strategy",
            "exhaustive",
            "--no-prune",
            "--max-steps",
            "10",
        ])?;

        let (engine, _) = args.engine_and_basket()?;
        let options = engine.options();

        assert_eq!(options.strategy, Strategy::Exhaustive);
        assert_eq!(options.prune, PruneRule::None);
        assert_eq!(options.limits.max_steps, Some(10));

        Ok(())
    }

    #[test]
    fn config_file_sets_prices_and_catalog() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "unit_price: \"10 GBP\"\ncatalog: \"AB\"")?;

        let path = file.path().to_string_lossy().into_owned();

        let args = PriceArgs::try_parse_from(["price", "AB", "--config", path.as_str()])?;
        let (engine, basket) = args.engine_and_basket()?;

        assert_eq!(engine.price(&basket), rust_decimal::Decimal::new(19, 0));

        let args = PriceArgs::try_parse_from(["price", "AC", "--config", path.as_str()])?;

        assert!(matches!(args.engine_and_basket(), Err(ConfigError::Basket(_))));

        Ok(())
    }
}
