//! Solvers for cover matrices

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::trace;

use crate::{basket::Kind, matrix::CoverMatrix};

pub mod exact_cover;

use exact_cover::{Cover, Covers};

/// How the exact-cover search is used to pick a price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Stop at the first cover strictly cheaper than the baseline.
    #[default]
    Threshold,

    /// Like `Threshold`, but keep going with the threshold lowered to every
    /// improvement found. Ends with the cheapest cover.
    Refine,

    /// Price every cover and keep the cheapest.
    Exhaustive,
}

/// Bounds on the exact-cover search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of row selections before the search gives up.
    pub max_steps: Option<u64>,
}

impl SearchLimits {
    /// No bound on the search.
    pub fn unbounded() -> Self {
        SearchLimits { max_steps: None }
    }

    /// Stop after `max_steps` row selections.
    pub fn with_max_steps(max_steps: u64) -> Self {
        SearchLimits {
            max_steps: Some(max_steps),
        }
    }
}

/// Observer for capturing what the search does.
///
/// Every callback has an empty default, so observers only implement what
/// they care about.
pub trait SearchObserver<K: Kind> {
    /// Called once the cover matrix for a basket has been built.
    fn on_matrix_built(&mut self, _matrix: &CoverMatrix<K>) {}

    /// Called for every cover the search produces, with its price.
    fn on_cover(&mut self, _cover: &Cover, _price: Decimal) {}

    /// Called when a cover beats the best price seen so far.
    fn on_improvement(&mut self, _cover: &Cover, _price: Decimal) {}
}

/// No-op observer for unobserved searches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<K: Kind> SearchObserver<K> for NoopObserver {}

/// Outcome of searching a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The chosen cover and its price, if one qualified.
    pub best: Option<(Cover, Decimal)>,

    /// Number of covers produced by the search.
    pub covers_examined: u64,

    /// Number of row selections made.
    pub steps: u64,

    /// Whether the step limit ended the search early.
    pub truncated: bool,
}

/// Search `matrix` for a cover according to `strategy`.
///
/// `Threshold` and `Refine` only accept covers strictly cheaper than
/// `threshold`. They cut off partial selections that cannot get there and
/// skip covers that only swap copies of a kind. `Exhaustive` visits every
/// cover, reports the cheapest regardless and lets the caller compare.
pub fn search<K, O>(
    matrix: &CoverMatrix<K>,
    strategy: Strategy,
    threshold: Decimal,
    limits: SearchLimits,
    observer: &mut O,
) -> SearchResult
where
    K: Kind,
    O: SearchObserver<K> + ?Sized,
{
    let mut bound = match strategy {
        Strategy::Threshold | Strategy::Refine => Some(threshold),
        Strategy::Exhaustive => None,
    };

    let mut covers = Covers::new(matrix, limits).with_bound(bound);

    if bound.is_some() {
        covers = covers.lowest_copies_only();
    }
    let mut best: Option<(Cover, Decimal)> = None;
    let mut covers_examined = 0u64;

    while let Some(cover) = covers.next() {
        let price = cover.price(matrix);
        covers_examined += 1;

        trace!(rows = ?cover.rows(), %price, "examined cover");
        observer.on_cover(&cover, price);

        if bound.is_some_and(|bound| price >= bound) {
            continue;
        }

        if best.as_ref().is_some_and(|(_, best_price)| price >= *best_price) {
            continue;
        }

        observer.on_improvement(&cover, price);
        best = Some((cover, price));

        match strategy {
            Strategy::Threshold => break,
            Strategy::Refine => {
                bound = Some(price);
                covers.set_bound(bound);
            }
            Strategy::Exhaustive => {}
        }
    }

    SearchResult {
        best,
        covers_examined,
        steps: covers.steps(),
        truncated: covers.is_truncated(),
    }
}
