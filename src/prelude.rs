//! Assort prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError, Kind},
    config::{ConfigError, EngineConfig, SearchConfig},
    discounts::{DiscountError, DiscountTable},
    groups::{Group, GroupGenerator, PricedGroup, PruneRule, RowKind},
    matrix::CoverMatrix,
    optimizer::{Partition, PricingEngine, Quote, QuoteSource, SearchOptions, SearchStats},
    pricing::{PriceList, PricingError},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    solvers::{
        NoopObserver, SearchLimits, SearchObserver, SearchResult, Strategy,
        exact_cover::{Cover, Covers},
        search,
    },
};
