//! Assort
//!
//! Assort prices a basket of items sold at one unit price, where groups of
//! distinct kinds earn a volume discount. The cheapest split of the basket
//! into groups is found by building an exact-cover matrix of candidate groups
//! and searching it for a partition cheaper than a greedy baseline.
//!
//! ```
//! use assort::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let engine = PricingEngine::reference();
//!
//! assert_eq!(engine.price(&Basket::parse("AABBCCDE")), Decimal::new(512, 1));
//! ```

pub mod basket;
pub mod cli;
pub mod config;
pub mod discounts;
pub mod groups;
pub mod matrix;
pub mod optimizer;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod solvers;
