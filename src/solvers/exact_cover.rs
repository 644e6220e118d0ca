//! Exact cover search
//!
//! Algorithm X over a [`CoverMatrix`], driven by an explicit stack instead of
//! recursion. At each level the lowest uncovered column is chosen and every
//! row covering it that does not clash with the current selection is tried,
//! in row order. Solutions therefore come out in a fixed order for a given
//! matrix.
//!
//! An optional price bound cuts off partial selections that cannot finish
//! strictly below it. Optionally, rows are only tried when they take the
//! lowest uncovered copy of each of their kinds, so covers that differ only in
//! which copy fills which row are produced once. Either way the remaining
//! covers come out in the same order as without the filter.

use rust_decimal::{Decimal, RoundingStrategy};
use smallvec::SmallVec;

use crate::{basket::Kind, matrix::CoverMatrix, solvers::SearchLimits};

/// A selection of matrix rows covering every column exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cover {
    rows: SmallVec<[usize; 16]>,
}

impl Cover {
    /// Selected row indexes, in selection order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing was selected (only valid for an empty basket).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total price of the selected rows.
    pub fn price<K: Kind>(&self, matrix: &CoverMatrix<K>) -> Decimal {
        matrix.price_of(&self.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Running,
    Done,
    Truncated,
}

/// Rows still to try for one chosen column.
#[derive(Debug)]
struct Frame {
    candidates: SmallVec<[usize; 8]>,
    next: usize,
}

/// Iterator over every exact cover of a matrix.
///
/// Stopping early is just dropping the iterator: no state outlives it.
#[derive(Debug)]
pub struct Covers<'m, K: Kind = char> {
    matrix: &'m CoverMatrix<K>,
    covered: Vec<bool>,
    uncovered: usize,
    stack: Vec<Frame>,
    selection: SmallVec<[usize; 16]>,
    selected_price: Decimal,
    bound: Option<Decimal>,
    min_unit_price: Decimal,
    lowest_copies: bool,
    state: State,
    steps: u64,
    limits: SearchLimits,
}

impl<'m, K: Kind> Covers<'m, K> {
    /// Start a search over `matrix`.
    pub fn new(matrix: &'m CoverMatrix<K>, limits: SearchLimits) -> Self {
        Covers {
            matrix,
            covered: vec![false; matrix.columns()],
            uncovered: matrix.columns(),
            stack: Vec::new(),
            selection: SmallVec::new(),
            selected_price: Decimal::ZERO,
            bound: None,
            min_unit_price: min_unit_price(matrix),
            lowest_copies: false,
            state: State::Start,
            steps: 0,
            limits,
        }
    }

    /// Only produce covers priced strictly below `bound`.
    #[must_use]
    pub fn with_bound(mut self, bound: Option<Decimal>) -> Self {
        self.bound = bound;
        self
    }

    /// Tighten or lift the price bound for the rest of the search.
    pub fn set_bound(&mut self, bound: Option<Decimal>) {
        self.bound = bound;
    }

    /// Skip rows that leave an earlier copy of one of their kinds uncovered.
    ///
    /// Every price reachable without this filter is still reached, but a
    /// basket with many copies per kind has far fewer covers to walk.
    #[must_use]
    pub fn lowest_copies_only(mut self) -> Self {
        self.lowest_copies = true;
        self
    }

    /// Number of row selections made so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether the step limit ended the search before it was exhausted.
    pub fn is_truncated(&self) -> bool {
        self.state == State::Truncated
    }

    fn first_uncovered(&self) -> Option<usize> {
        if self.uncovered == 0 {
            return None;
        }

        self.covered.iter().position(|covered| !covered)
    }

    fn fits(&self, row: usize) -> bool {
        self.matrix.row(row).is_some_and(|group| {
            group
                .instances()
                .iter()
                .all(|&column| self.covered.get(column) == Some(&false))
        })
    }

    fn takes_lowest_copies(&self, row: usize) -> bool {
        self.matrix.row(row).is_some_and(|group| {
            group.instances().iter().all(|&column| {
                self.matrix.previous_copy(column).is_none_or(|previous| {
                    self.covered.get(previous) == Some(&true)
                        || group.instances().contains(&previous)
                })
            })
        })
    }

    fn frame_for(&self, column: usize) -> Frame {
        Frame {
            candidates: self
                .matrix
                .rows_covering(column)
                .iter()
                .copied()
                .filter(|&row| self.fits(row))
                .filter(|&row| !self.lowest_copies || self.takes_lowest_copies(row))
                .collect(),
            next: 0,
        }
    }

    /// Whether selecting `row` leaves no way to finish below the bound. Every
    /// uncovered column still costs at least the cheapest per-item price.
    fn exceeds_bound(&self, row: usize) -> bool {
        let (Some(bound), Some(group)) = (self.bound, self.matrix.row(row)) else {
            return false;
        };

        let left = self.uncovered.saturating_sub(group.instances().len());
        let lower =
            self.selected_price + group.price() + Decimal::from(left) * self.min_unit_price;

        lower >= bound
    }

    fn select(&mut self, row: usize) {
        let Some(group) = self.matrix.row(row) else {
            return;
        };

        for &column in group.instances() {
            if let Some(covered) = self.covered.get_mut(column) {
                debug_assert!(!*covered, "row {row} overlaps column {column}");
                *covered = true;
            }
        }

        self.uncovered -= group.instances().len();
        self.selected_price += group.price();
        self.selection.push(row);
    }

    fn deselect(&mut self) {
        let Some(row) = self.selection.pop() else {
            return;
        };

        let Some(group) = self.matrix.row(row) else {
            return;
        };

        for &column in group.instances() {
            if let Some(covered) = self.covered.get_mut(column) {
                *covered = false;
            }
        }

        self.uncovered += group.instances().len();
        self.selected_price -= group.price();
    }

    fn out_of_steps(&self) -> bool {
        self.limits.max_steps.is_some_and(|max| self.steps >= max)
    }
}

impl<K: Kind> Iterator for Covers<'_, K> {
    type Item = Cover;

    fn next(&mut self) -> Option<Cover> {
        match self.state {
            State::Done | State::Truncated => return None,
            State::Start => {
                self.state = State::Running;

                let Some(column) = self.first_uncovered() else {
                    // No columns: the empty selection is the one and only cover.
                    self.state = State::Done;
                    return Some(Cover::default());
                };

                let frame = self.frame_for(column);
                self.stack.push(frame);
            }
            State::Running => {}
        }

        loop {
            let depth = self.stack.len();

            if depth == 0 {
                self.state = State::Done;
                return None;
            }

            // The top frame's previous choice is still selected.
            if self.selection.len() == depth {
                self.deselect();
            }

            let Some(frame) = self.stack.last_mut() else {
                continue;
            };

            let Some(&row) = frame.candidates.get(frame.next) else {
                self.stack.pop();
                continue;
            };

            frame.next += 1;

            if self.exceeds_bound(row) {
                continue;
            }

            if self.out_of_steps() {
                self.state = State::Truncated;
                return None;
            }

            self.steps += 1;
            self.select(row);

            match self.first_uncovered() {
                None => {
                    return Some(Cover {
                        rows: self.selection.clone(),
                    });
                }
                Some(column) => {
                    let frame = self.frame_for(column);
                    self.stack.push(frame);
                }
            }
        }
    }
}

/// Cheapest price per item over all rows, rounded down.
fn min_unit_price<K: Kind>(matrix: &CoverMatrix<K>) -> Decimal {
    matrix
        .rows()
        .iter()
        .filter(|group| !group.instances().is_empty())
        .map(|group| {
            (group.price() / Decimal::from(group.instances().len()))
                .round_dp_with_strategy(12, RoundingStrategy::ToZero)
        })
        .min()
        .unwrap_or(Decimal::ZERO)
}
