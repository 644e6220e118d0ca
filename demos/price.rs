//! Price Example
//!
//! Prices a basket given as a string of kinds and prints the receipt.
//!
//! Use `-c` to load a YAML engine configuration
//! Use `-s` to pick the search strategy (threshold, refine, exhaustive)
//! Set `RUST_LOG=assort=debug` to see the search at work

use std::{io, time::Instant};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use assort::{cli::PriceArgs, receipt::Receipt};

/// Price Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = PriceArgs::parse();
    let (engine, basket) = args.engine_and_basket()?;

    let start = Instant::now();
    let quote = engine.quote(&basket);
    let elapsed = start.elapsed().as_secs_f32();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_quote(&quote, engine.prices()).write_to(&mut handle)?;

    let stats = quote.stats();

    println!(
        "Search: {} rows, {} steps, {} covers{}",
        stats.rows,
        stats.steps,
        stats.covers_examined,
        if stats.truncated { " (truncated)" } else { "" }
    );
    println!("Solution: {elapsed}s");

    Ok(())
}
