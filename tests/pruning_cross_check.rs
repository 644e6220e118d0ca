//! Cross-checks the pruned search against a brute-force optimum on every small basket.

use itertools::Itertools;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use testresult::TestResult;

use assort::{
    basket::Basket,
    discounts::DiscountTable,
    groups::PruneRule,
    optimizer::{PricingEngine, SearchOptions},
    pricing::PriceList,
    solvers::Strategy,
};

const KINDS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

type Counts = [u8; 5];

/// Cheapest price for `counts` by trying every set of distinct kinds as the
/// next group. Independent of the cover matrix and its pruning.
fn optimum(counts: Counts, prices: &PriceList, memo: &mut FxHashMap<Counts, Decimal>) -> Decimal {
    if counts.iter().all(|&count| count == 0) {
        return Decimal::ZERO;
    }

    if let Some(&price) = memo.get(&counts) {
        return price;
    }

    let mut best: Option<Decimal> = None;

    for mask in 1u8..32 {
        let mut rest = counts;
        let mut size = 0;
        let mut fits = true;

        for (bit, count) in rest.iter_mut().enumerate() {
            if mask & (1 << bit) == 0 {
                continue;
            }

            if *count == 0 {
                fits = false;
                break;
            }

            *count -= 1;
            size += 1;
        }

        if !fits || size > prices.max_group_size() {
            continue;
        }

        let price = prices.distinct_subtotal(size) + optimum(rest, prices, memo);

        best = Some(best.map_or(price, |best| best.min(price)));
    }

    let best = best.unwrap_or(Decimal::MAX);

    memo.insert(counts, best);

    best
}

fn counts_of(basket: &str) -> Counts {
    let mut counts = Counts::default();

    for kind in basket.chars() {
        if let Some(slot) = KINDS
            .iter()
            .position(|&k| k == kind)
            .and_then(|idx| counts.get_mut(idx))
        {
            *slot += 1;
        }
    }

    counts
}

/// Every basket over `kinds` with at most `max_items` items, each in sorted
/// and in shuffled order.
fn baskets(kinds: &[char], max_items: usize) -> Vec<String> {
    (0..=max_items)
        .flat_map(|size| kinds.iter().copied().combinations_with_replacement(size))
        .flat_map(|items| {
            let sorted: String = items.iter().collect();
            let shuffled: String = items
                .iter()
                .skip(1)
                .step_by(2)
                .chain(items.iter().step_by(2))
                .collect();

            [sorted, shuffled]
        })
        .collect()
}

fn engine(prices: &PriceList, strategy: Strategy, prune: PruneRule) -> PricingEngine {
    PricingEngine::with_options(
        prices.clone(),
        SearchOptions::default()
            .with_strategy(strategy)
            .with_prune(prune),
    )
}

#[test]
fn pruned_search_finds_the_optimum() {
    let prices = PriceList::reference();
    let mut memo = FxHashMap::default();

    let exhaustive = engine(&prices, Strategy::Exhaustive, PruneRule::default());
    let refine = engine(&prices, Strategy::Refine, PruneRule::default());

    for input in baskets(&KINDS, 7) {
        let expected = optimum(counts_of(&input), &prices, &mut memo);
        let basket = Basket::parse(&input);

        assert_eq!(exhaustive.price(&basket), expected, "exhaustive {input:?}");
        assert_eq!(refine.price(&basket), expected, "refine {input:?}");
    }
}

#[test]
fn threshold_lies_between_optimum_and_baseline() {
    let prices = PriceList::reference();
    let mut memo = FxHashMap::default();

    let threshold = engine(&prices, Strategy::Threshold, PruneRule::default());

    for input in baskets(&KINDS, 7) {
        let expected = optimum(counts_of(&input), &prices, &mut memo);
        let quote = threshold.quote(&Basket::parse(&input));

        assert!(quote.total() >= expected, "{input:?} below optimum");
        assert!(quote.total() <= quote.baseline_total(), "{input:?} above baseline");
    }
}

#[test]
fn unpruned_search_finds_the_optimum() {
    let prices = PriceList::reference();
    let mut memo = FxHashMap::default();

    let exhaustive = engine(&prices, Strategy::Exhaustive, PruneRule::None);

    for input in baskets(&KINDS, 6) {
        let expected = optimum(counts_of(&input), &prices, &mut memo);

        assert_eq!(exhaustive.price(&Basket::parse(&input)), expected, "{input:?}");
    }
}

#[test]
fn unpruned_search_handles_pair_heavy_tables() -> TestResult {
    // Pairs earn more than larger groups, so small groups matter.
    let prices = PriceList::new(
        Decimal::new(8, 0),
        rusty_money::iso::EUR,
        DiscountTable::from_percent_points(&[0, 0, 25, 10, 5])?,
    )?;
    let mut memo = FxHashMap::default();

    let exhaustive = engine(&prices, Strategy::Exhaustive, PruneRule::None);

    for input in baskets(&['A', 'B', 'C', 'D'], 6) {
        let expected = optimum(counts_of(&input), &prices, &mut memo);

        assert_eq!(exhaustive.price(&Basket::parse(&input)), expected, "{input:?}");
    }

    // ABCD as two pairs: 2 * 12 beats 4 * 8 * 0.95
    assert_eq!(exhaustive.price(&Basket::parse("ABCD")), Decimal::new(24, 0));

    Ok(())
}
