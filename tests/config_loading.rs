//! Integration tests for loading engine configuration from YAML files.

use std::{io::Write, path::PathBuf};

use rust_decimal::Decimal;
use rusty_money::iso::GBP;
use testresult::TestResult;

use assort::{
    basket::Basket,
    config::{ConfigError, EngineConfig},
    groups::PruneRule,
    optimizer::PricingEngine,
    solvers::Strategy,
};

fn reference_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("reference.yml")
}

#[test]
fn reference_file_matches_reference_engine() -> TestResult {
    let config = EngineConfig::load(reference_path())?;

    let engine = config.engine()?;

    assert_eq!(engine, PricingEngine::reference());
    assert_eq!(
        engine.price(&config.parse_basket("AABBCCDE")?),
        Decimal::new(512, 1)
    );

    Ok(())
}

#[test]
fn custom_file_is_loaded() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;

    writeln!(
        file,
        r#"
unit_price: "10.00 GBP"
catalog: "ABC"
discounts: ["0%", "0%", "10%", "0.2"]
search:
  strategy: refine
  prune_below: null
  max_steps: 10000
"#
    )?;

    let config = EngineConfig::load(file.path())?;
    let engine = config.engine()?;

    assert_eq!(engine.prices().currency(), GBP);
    assert_eq!(engine.prices().max_group_size(), 3);
    assert_eq!(engine.options().strategy, Strategy::Refine);
    assert_eq!(engine.options().prune, PruneRule::None);
    assert_eq!(engine.options().limits.max_steps, Some(10_000));

    // ABC + AB = 24 + 18
    assert_eq!(engine.price(&config.parse_basket("AABBC")?), Decimal::new(42, 0));

    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let result = EngineConfig::load(reference_path().with_file_name("missing.yml"));

    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn malformed_yaml_is_a_yaml_error() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "unit_price: [not, a, price")?;

    let result = EngineConfig::load(file.path());

    assert!(matches!(result, Err(ConfigError::Yaml(_))));

    Ok(())
}

#[test]
fn catalog_rejects_unknown_kinds() -> TestResult {
    let config = EngineConfig::load(reference_path())?;

    let result = config.parse_basket("ABF");

    assert!(matches!(result, Err(ConfigError::Basket(_))));
    assert_eq!(Basket::parse("ABF").len(), 3);

    Ok(())
}
