//! Basket

use std::{collections::BTreeMap, fmt, hash::Hash};

use thiserror::Error;

/// A catalog label. Any small, totally ordered, copyable value will do; the
/// default is a single `char` such as `'A'`.
pub trait Kind: Copy + Ord + Hash + fmt::Debug + fmt::Display {}

impl<T> Kind for T where T: Copy + Ord + Hash + fmt::Debug + fmt::Display {}

/// Errors related to basket construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BasketError {
    /// An item's kind is not part of the catalog (position, kind).
    #[error("Item {0} has kind {1:?}, which is not in the catalog")]
    UnknownKind(usize, char),
}

/// Basket
///
/// An ordered sequence of item instances. Everything derived from a basket
/// refers to instances by their position, never by value: two copies of the
/// same kind are different items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basket<K: Kind = char> {
    items: Vec<K>,
}

impl<K: Kind> Basket<K> {
    /// Create an empty basket.
    pub fn new() -> Self {
        Basket { items: Vec::new() }
    }

    /// Create a new basket with the given items.
    pub fn with_items(items: impl Into<Vec<K>>) -> Self {
        Basket {
            items: items.into(),
        }
    }

    /// Get the kind of the instance at `idx`.
    pub fn get(&self, idx: usize) -> Option<K> {
        self.items.get(idx).copied()
    }

    /// Iterate over the kinds of all instances, in basket order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.items.iter()
    }

    /// Get the number of items in the basket.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Instance indexes of every item, in basket order.
    pub fn instances(&self) -> Vec<usize> {
        (0..self.items.len()).collect()
    }

    /// Number of copies of each kind, ordered by kind.
    pub fn counts(&self) -> BTreeMap<K, usize> {
        let mut counts = BTreeMap::new();

        for kind in &self.items {
            *counts.entry(*kind).or_insert(0) += 1;
        }

        counts
    }

    /// Number of distinct kinds in the basket.
    pub fn distinct_kinds(&self) -> usize {
        self.counts().len()
    }

    /// Map each kind present among `instances` to its lowest instance index.
    ///
    /// Indexes that are out of range for this basket are ignored.
    pub fn first_instances(&self, instances: &[usize]) -> BTreeMap<K, usize> {
        let mut firsts = BTreeMap::new();

        for &idx in instances {
            if let Some(kind) = self.get(idx) {
                firsts
                    .entry(kind)
                    .and_modify(|first: &mut usize| *first = (*first).min(idx))
                    .or_insert(idx);
            }
        }

        firsts
    }
}

impl<K: Kind> Default for Basket<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> FromIterator<K> for Basket<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Basket {
            items: iter.into_iter().collect(),
        }
    }
}

impl Basket<char> {
    /// Parse a basket from a string of single-character labels.
    ///
    /// Whitespace is ignored, so `"AB CD"` and `"ABCD"` are the same basket.
    pub fn parse(input: &str) -> Self {
        input.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Parse a basket, rejecting any label that is not in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::UnknownKind`] with the position (ignoring
    /// whitespace) of the first label outside the catalog.
    pub fn parse_with_catalog(input: &str, catalog: &[char]) -> Result<Self, BasketError> {
        let basket = Self::parse(input);

        basket
            .iter()
            .enumerate()
            .try_for_each(|(idx, kind)| {
                if catalog.contains(kind) {
                    Ok(())
                } else {
                    Err(BasketError::UnknownKind(idx, *kind))
                }
            })?;

        Ok(basket)
    }
}

impl From<&str> for Basket<char> {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl<K: Kind> fmt::Display for Basket<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.items.iter().try_for_each(|kind| write!(f, "{kind}"))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_ignores_whitespace() {
        let basket = Basket::parse(" AB\tC D\n");

        assert_eq!(basket, Basket::with_items(['A', 'B', 'C', 'D']));
        assert_eq!(basket.to_string(), "ABCD");
    }

    #[test]
    fn parse_empty_string_is_empty_basket() {
        let basket = Basket::parse("");

        assert!(basket.is_empty());
        assert_eq!(basket.len(), 0);
    }

    #[test]
    fn parse_with_catalog_accepts_known_kinds() -> TestResult {
        let basket = Basket::parse_with_catalog("EDCBA", &['A', 'B', 'C', 'D', 'E'])?;

        assert_eq!(basket.len(), 5);

        Ok(())
    }

    #[test]
    fn parse_with_catalog_rejects_unknown_kind() {
        let result = Basket::parse_with_catalog("AB XA", &['A', 'B', 'C', 'D', 'E']);

        assert_eq!(result, Err(BasketError::UnknownKind(2, 'X')));
    }

    #[test]
    fn counts_are_ordered_by_kind() {
        let basket = Basket::parse("CABAC");

        let counts: Vec<(char, usize)> = basket.counts().into_iter().collect();

        assert_eq!(counts, vec![('A', 2), ('B', 1), ('C', 2)]);
        assert_eq!(basket.distinct_kinds(), 3);
    }

    #[test]
    fn first_instances_picks_lowest_remaining_index() {
        let basket = Basket::parse("AABBA");

        let firsts: Vec<(char, usize)> =
            basket.first_instances(&[4, 3, 1, 2]).into_iter().collect();

        assert_eq!(firsts, vec![('A', 1), ('B', 2)]);
    }

    #[test]
    fn first_instances_skips_out_of_range_indexes() {
        let basket = Basket::parse("AB");

        let firsts = basket.first_instances(&[1, 7]);

        assert_eq!(firsts.len(), 1);
        assert_eq!(firsts.get(&'B'), Some(&1));
    }

    #[test]
    fn integer_kinds_are_supported() {
        let basket: Basket<u8> = [3, 1, 3].into_iter().collect();

        assert_eq!(basket.distinct_kinds(), 2);
        assert_eq!(basket.get(2), Some(3));
        assert_eq!(basket.get(3), None);
    }
}
