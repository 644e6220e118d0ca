//! Cover matrix
//!
//! One column per basket instance, one row per candidate group. Rows are
//! discovered by repeatedly taking a generated group out of the remaining
//! instances and expanding what is left, depth first. Any remaining set that
//! cannot form a group of two or more kinds becomes a single residual row, so
//! every instance is always coverable.
//!
//! Copies of a kind are interchangeable. Each column remembers the previous
//! copy of its kind so the search can skip covers that only swap copies.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    basket::{Basket, Kind},
    groups::{Group, GroupGenerator, Instances, PricedGroup, PruneRule},
    pricing::PriceList,
};

/// Rows covering a single column.
type ColumnRows = SmallVec<[usize; 8]>;

/// Candidate groups over the instances of a basket.
#[derive(Debug, Clone)]
pub struct CoverMatrix<K: Kind = char> {
    columns: usize,
    rows: Vec<PricedGroup<K>>,
    by_column: Vec<ColumnRows>,
    previous_copy: Vec<Option<usize>>,
}

/// A pending expansion of one remaining-instance set.
struct Expansion<K: Kind> {
    remaining: Vec<usize>,
    groups: std::vec::IntoIter<Group<K>>,
}

impl<K: Kind> CoverMatrix<K> {
    /// Build the matrix for `basket`.
    pub fn build(basket: &Basket<K>, prices: &PriceList, prune: PruneRule) -> Self {
        let generator = GroupGenerator::new(basket, prices.max_group_size(), prune);
        let mut builder = Builder {
            basket,
            prices,
            generator,
            matrix: CoverMatrix {
                columns: basket.len(),
                rows: Vec::new(),
                by_column: vec![ColumnRows::new(); basket.len()],
                previous_copy: previous_copies(basket),
            },
            seen_rows: FxHashSet::default(),
            expanded: FxHashSet::default(),
        };

        builder.run(basket.instances());

        debug!(
            columns = builder.matrix.columns,
            rows = builder.matrix.rows.len(),
            "built cover matrix"
        );

        builder.matrix
    }

    /// Number of columns (basket instances).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// All rows, in discovery order.
    pub fn rows(&self) -> &[PricedGroup<K>] {
        &self.rows
    }

    /// Get a row by index.
    pub fn row(&self, row: usize) -> Option<&PricedGroup<K>> {
        self.rows.get(row)
    }

    /// Indexes of the rows covering `column`, in row order.
    pub fn rows_covering(&self, column: usize) -> &[usize] {
        self.by_column
            .get(column)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    /// The nearest earlier column holding the same kind as `column`.
    pub fn previous_copy(&self, column: usize) -> Option<usize> {
        self.previous_copy.get(column).copied().flatten()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total price of a selection of rows. Unknown rows contribute nothing.
    pub fn price_of(&self, rows: &[usize]) -> Decimal {
        rows.iter()
            .filter_map(|&row| self.row(row))
            .map(PricedGroup::price)
            .sum()
    }

    fn push_row(&mut self, row: PricedGroup<K>) {
        let idx = self.rows.len();

        for &column in row.instances() {
            if let Some(rows) = self.by_column.get_mut(column) {
                rows.push(idx);
            }
        }

        self.rows.push(row);
    }
}

fn previous_copies<K: Kind>(basket: &Basket<K>) -> Vec<Option<usize>> {
    let mut last: FxHashMap<K, usize> = FxHashMap::default();

    basket
        .iter()
        .enumerate()
        .map(|(idx, &kind)| last.insert(kind, idx))
        .collect()
}

struct Builder<'a, K: Kind> {
    basket: &'a Basket<K>,
    prices: &'a PriceList,
    generator: GroupGenerator<'a, K>,
    matrix: CoverMatrix<K>,
    seen_rows: FxHashSet<Instances>,
    expanded: FxHashSet<Vec<usize>>,
}

impl<K: Kind> Builder<'_, K> {
    fn run(&mut self, all: Vec<usize>) {
        let mut stack: Vec<Expansion<K>> = self.open(all).into_iter().collect();

        while let Some(top) = stack.last_mut() {
            let Some(group) = top.groups.next() else {
                stack.pop();
                continue;
            };

            let rest: Vec<usize> = top
                .remaining
                .iter()
                .copied()
                .filter(|idx| !group.instances().contains(idx))
                .collect();

            self.add(PricedGroup::distinct(group, self.prices));

            if let Some(expansion) = self.open(rest) {
                stack.push(expansion);
            }
        }
    }

    /// Start expanding `remaining`, or close it off with a residual row when
    /// no group can be formed. Sets that were already expanded are skipped:
    /// they would only rediscover the same rows.
    fn open(&mut self, remaining: Vec<usize>) -> Option<Expansion<K>> {
        if remaining.is_empty() || !self.expanded.insert(remaining.clone()) {
            return None;
        }

        let groups: Vec<Group<K>> = self.generator.groups(&remaining).collect();

        if groups.is_empty() {
            let residual = Group::from_instances(self.basket, &remaining);
            self.add(PricedGroup::residual(residual, self.prices));

            return None;
        }

        Some(Expansion {
            remaining,
            groups: groups.into_iter(),
        })
    }

    fn add(&mut self, row: PricedGroup<K>) {
        let key: Instances = row.instances().iter().copied().collect();

        if self.seen_rows.insert(key) {
            self.matrix.push_row(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::RowKind;

    fn row_labels(matrix: &CoverMatrix) -> Vec<String> {
        matrix.rows().iter().map(PricedGroup::label).collect()
    }

    #[test]
    fn empty_basket_has_no_rows() {
        let basket = Basket::parse("");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        assert_eq!(matrix.columns(), 0);
        assert!(matrix.is_empty());
    }

    #[test]
    fn single_kind_is_one_residual_row() {
        let basket = Basket::parse("AAA");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.row(0).map(PricedGroup::kind), Some(RowKind::Residual));
        assert_eq!(matrix.row(0).map(PricedGroup::price), Some(Decimal::new(24, 0)));
    }

    #[test]
    fn rows_follow_depth_first_order() {
        let basket = Basket::parse("AAB");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        assert_eq!(row_labels(&matrix), vec!["AB", "A"]);
        assert_eq!(matrix.row(0).map(PricedGroup::instances), Some([0, 2].as_slice()));
        assert_eq!(matrix.row(1).map(PricedGroup::instances), Some([1].as_slice()));
    }

    #[test]
    fn identical_instance_sets_are_deduplicated() {
        let basket = Basket::parse("ABC");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::None);

        // AB -> C, AC -> B, BC -> A, ABC
        assert_eq!(row_labels(&matrix), vec!["AB", "C", "AC", "B", "BC", "A", "ABC"]);

        let mut keys: Vec<&[usize]> = matrix.rows().iter().map(PricedGroup::instances).collect();
        keys.sort_unstable();
        keys.dedup();

        assert_eq!(keys.len(), matrix.len());
    }

    #[test]
    fn every_column_is_covered() {
        let basket = Basket::parse("AABBCCDE");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        for column in 0..matrix.columns() {
            assert!(
                !matrix.rows_covering(column).is_empty(),
                "column {column} has no covering row"
            );
        }
    }

    #[test]
    fn rows_covering_is_consistent_with_rows() {
        let basket = Basket::parse("AABBC");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::None);

        for column in 0..matrix.columns() {
            for &row in matrix.rows_covering(column) {
                let covers = matrix
                    .row(row)
                    .is_some_and(|group| group.instances().contains(&column));

                assert!(covers, "row {row} listed for column {column} but does not cover it");
            }
        }

        assert!(matrix.rows_covering(99).is_empty());
    }

    #[test]
    fn previous_copy_links_same_kind_columns() {
        let basket = Basket::parse("ABAAB");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        let links: Vec<Option<usize>> = (0..6).map(|column| matrix.previous_copy(column)).collect();

        assert_eq!(links, vec![None, None, Some(0), Some(2), Some(1), None]);
    }

    #[test]
    fn price_of_sums_selected_rows() {
        let basket = Basket::parse("AAB");

        let matrix = CoverMatrix::build(&basket, &PriceList::reference(), PruneRule::default());

        assert_eq!(matrix.price_of(&[0, 1]), Decimal::new(232, 1));
    }
}
