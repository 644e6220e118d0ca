//! Optimizer
//!
//! Prices a basket by first building a greedy baseline (one of every
//! remaining kind per group until the basket is empty) and then searching the
//! cover matrix for a cheaper partition.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::{debug, debug_span, warn};

use crate::{
    basket::{Basket, Kind},
    groups::{Group, PricedGroup, PruneRule},
    matrix::CoverMatrix,
    pricing::PriceList,
    solvers::{NoopObserver, SearchLimits, SearchObserver, Strategy, search},
};

/// Search settings for a [`PricingEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// How covers are searched.
    pub strategy: Strategy,

    /// Group-size pruning applied while building the matrix.
    pub prune: PruneRule,

    /// Bounds on the exact-cover search.
    pub limits: SearchLimits,
}

impl SearchOptions {
    /// Use the given strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use the given pruning rule.
    #[must_use]
    pub fn with_prune(mut self, prune: PruneRule) -> Self {
        self.prune = prune;
        self
    }

    /// Use the given search limits.
    #[must_use]
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// A basket split into priced groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<K: Kind = char> {
    groups: Vec<PricedGroup<K>>,
}

impl<K: Kind> Partition<K> {
    /// Create a partition from priced groups.
    pub fn new(groups: Vec<PricedGroup<K>>) -> Self {
        Partition { groups }
    }

    /// The groups, in the order they were chosen.
    pub fn groups(&self) -> &[PricedGroup<K>] {
        &self.groups
    }

    /// Sum of the group prices.
    pub fn total(&self) -> Decimal {
        self.groups.iter().map(PricedGroup::price).sum()
    }

    /// Number of instances across all groups.
    pub fn items(&self) -> usize {
        self.groups.iter().map(|group| group.instances().len()).sum()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the partition has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group labels, e.g. `["ABCD", "ABCE"]`.
    pub fn labels(&self) -> Vec<String> {
        self.groups.iter().map(PricedGroup::label).collect()
    }
}

/// Where a quote's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// The basket was empty; nothing was searched.
    Empty,

    /// No cover beat the greedy baseline.
    Baseline,

    /// The exact-cover search found a cheaper partition.
    Search,
}

/// Counters describing one pricing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Rows in the cover matrix.
    pub rows: usize,

    /// Row selections made by the search.
    pub steps: u64,

    /// Covers produced by the search.
    pub covers_examined: u64,

    /// Whether the step limit ended the search early.
    pub truncated: bool,
}

/// The priced result for a basket.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<K: Kind = char> {
    partition: Partition<K>,
    baseline_total: Decimal,
    full_price: Decimal,
    source: QuoteSource,
    stats: SearchStats,
}

impl<K: Kind> Quote<K> {
    /// Total price of the basket.
    pub fn total(&self) -> Decimal {
        self.partition.total()
    }

    /// The chosen partition.
    pub fn partition(&self) -> &Partition<K> {
        &self.partition
    }

    /// Price of the greedy baseline partition.
    pub fn baseline_total(&self) -> Decimal {
        self.baseline_total
    }

    /// Price of every item bought on its own.
    pub fn full_price(&self) -> Decimal {
        self.full_price
    }

    /// Amount saved against the full price.
    pub fn savings(&self) -> Decimal {
        self.full_price - self.total()
    }

    /// Where the price came from.
    pub fn source(&self) -> QuoteSource {
        self.source
    }

    /// Search counters.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }
}

/// Pricing engine
///
/// Holds the price list and search options; every call prices one basket
/// from scratch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingEngine {
    prices: PriceList,
    options: SearchOptions,
}

impl PricingEngine {
    /// Create an engine with default search options.
    pub fn new(prices: PriceList) -> Self {
        Self::with_options(prices, SearchOptions::default())
    }

    /// Create an engine with explicit search options.
    pub fn with_options(prices: PriceList, options: SearchOptions) -> Self {
        PricingEngine { prices, options }
    }

    /// Engine using the reference price list and default options.
    pub fn reference() -> Self {
        Self::new(PriceList::reference())
    }

    /// The price list.
    pub fn prices(&self) -> &PriceList {
        &self.prices
    }

    /// The search options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Minimum price for `basket`.
    pub fn price<K: Kind>(&self, basket: &Basket<K>) -> Decimal {
        self.quote(basket).total()
    }

    /// Minimum price for `basket` as a float.
    pub fn price_f64<K: Kind>(&self, basket: &Basket<K>) -> f64 {
        self.price(basket).normalize().to_f64().unwrap_or(f64::NAN)
    }

    /// Greedy baseline: repeatedly take one instance of each remaining kind
    /// (up to the largest group the table prices) until nothing is left.
    ///
    /// # Panics
    ///
    /// Panics if a round takes no items, which would mean the basket's own
    /// instance list is out of range.
    pub fn baseline<K: Kind>(&self, basket: &Basket<K>) -> Partition<K> {
        let max_size = self.prices.max_group_size();
        let mut remaining = basket.instances();
        let mut groups = Vec::new();

        while !remaining.is_empty() {
            let taken: Vec<(K, usize)> = basket
                .first_instances(&remaining)
                .into_iter()
                .take(max_size)
                .collect();

            // Every remaining index is in range, so at least one kind is taken.
            assert!(!taken.is_empty(), "baseline made no progress");

            remaining.retain(|idx| !taken.iter().any(|(_, taken)| taken == idx));

            let group = Group::from_pairs(taken);

            groups.push(if group.len() == 1 {
                PricedGroup::residual(group, &self.prices)
            } else {
                PricedGroup::distinct(group, &self.prices)
            });
        }

        Partition::new(groups)
    }

    /// Price `basket` and describe how.
    pub fn quote<K: Kind>(&self, basket: &Basket<K>) -> Quote<K> {
        self.quote_with_observer(basket, &mut NoopObserver)
    }

    /// Price `basket`, reporting progress to `observer`.
    pub fn quote_with_observer<K, O>(&self, basket: &Basket<K>, observer: &mut O) -> Quote<K>
    where
        K: Kind,
        O: SearchObserver<K> + ?Sized,
    {
        let span = debug_span!("quote", items = basket.len(), strategy = ?self.options.strategy);
        let _guard = span.enter();

        let full_price = self.prices.full_price(basket.len());

        if basket.is_empty() {
            return Quote {
                partition: Partition::new(Vec::new()),
                baseline_total: Decimal::ZERO,
                full_price,
                source: QuoteSource::Empty,
                stats: SearchStats::default(),
            };
        }

        let baseline = self.baseline(basket);
        let baseline_total = baseline.total();

        debug!(%baseline_total, groups = ?baseline.labels(), "baseline");

        let matrix = CoverMatrix::build(basket, &self.prices, self.options.prune);
        observer.on_matrix_built(&matrix);

        let result = search(
            &matrix,
            self.options.strategy,
            baseline_total,
            self.options.limits,
            observer,
        );

        let stats = SearchStats {
            rows: matrix.len(),
            steps: result.steps,
            covers_examined: result.covers_examined,
            truncated: result.truncated,
        };

        if stats.truncated {
            warn!(
                steps = stats.steps,
                "search stopped at step limit; price may not be minimal"
            );
        }

        let (partition, source) = match result.best {
            Some((cover, price)) if price < baseline_total => {
                debug!(%price, %baseline_total, "search beat baseline");

                let groups = cover
                    .rows()
                    .iter()
                    .filter_map(|&row| matrix.row(row).cloned())
                    .collect();

                (Partition::new(groups), QuoteSource::Search)
            }
            _ => (baseline, QuoteSource::Baseline),
        };

        debug_assert_eq!(
            partition.items(),
            basket.len(),
            "partition does not cover the basket"
        );

        Quote {
            partition,
            baseline_total,
            full_price,
            source,
            stats,
        }
    }
}
