//! Candidate groups
//!
//! A [`Group`] bundles some basket instances together so they are priced as
//! one. The [`GroupGenerator`] enumerates the groups of distinct kinds that
//! can be formed from whatever instances are still unassigned.

use std::fmt;

use itertools::Itertools;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    basket::{Basket, Kind},
    pricing::PriceList,
};

/// Instance indexes of a group, ascending.
pub type Instances = SmallVec<[usize; 5]>;

/// A set of basket instances priced together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group<K: Kind = char> {
    instances: Instances,
    kinds: SmallVec<[K; 5]>,
}

impl<K: Kind> Group<K> {
    /// Build a group from `(kind, instance)` pairs.
    ///
    /// Kinds keep the order they are given in; instances are stored ascending
    /// so two groups over the same items compare equal.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, usize)>) -> Self {
        let (kinds, mut instances): (SmallVec<[K; 5]>, Instances) = pairs.into_iter().unzip();
        instances.sort_unstable();

        Group { instances, kinds }
    }

    /// Build a group covering `instances` of `basket`.
    ///
    /// Indexes outside the basket are ignored.
    pub fn from_instances(basket: &Basket<K>, instances: &[usize]) -> Self {
        Self::from_pairs(
            instances
                .iter()
                .filter_map(|&idx| basket.get(idx).map(|kind| (kind, idx))),
        )
    }

    /// Instance indexes, ascending.
    pub fn instances(&self) -> &[usize] {
        &self.instances
    }

    /// Kinds of the grouped instances.
    pub fn kinds(&self) -> &[K] {
        &self.kinds
    }

    /// Number of instances in the group.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of distinct kinds in the group.
    pub fn distinct_kinds(&self) -> usize {
        self.kinds.iter().sorted().dedup().count()
    }

    /// Human-readable label, e.g. `"ABCD"`.
    pub fn label(&self) -> String {
        self.kinds.iter().join("")
    }
}

impl<K: Kind> fmt::Display for Group<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a group is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Every instance is a different kind; the discount table applies.
    Distinct,

    /// Whatever is left once no two kinds can be combined. This is always
    /// copies of a single kind and is priced without discount.
    Residual,
}

/// A group with its price fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedGroup<K: Kind = char> {
    group: Group<K>,
    kind: RowKind,
    price: Decimal,
}

impl<K: Kind> PricedGroup<K> {
    /// Price a group of pairwise distinct kinds.
    ///
    /// # Panics
    ///
    /// Panics if the group is empty or repeats a kind.
    pub fn distinct(group: Group<K>, prices: &PriceList) -> Self {
        assert!(!group.is_empty(), "distinct group must not be empty");
        assert_eq!(
            group.distinct_kinds(),
            group.len(),
            "distinct group {group} repeats a kind"
        );

        let price = prices.distinct_subtotal(group.len());

        PricedGroup {
            group,
            kind: RowKind::Distinct,
            price,
        }
    }

    /// Price a residual group of a single kind.
    ///
    /// # Panics
    ///
    /// Panics if the group is empty or mixes kinds.
    pub fn residual(group: Group<K>, prices: &PriceList) -> Self {
        assert!(!group.is_empty(), "residual group must not be empty");
        assert_eq!(
            group.distinct_kinds(),
            1,
            "residual group {group} mixes kinds"
        );

        let price = prices.same_kind_subtotal(group.len());

        PricedGroup {
            group,
            kind: RowKind::Residual,
            price,
        }
    }

    /// The underlying group.
    pub fn group(&self) -> &Group<K> {
        &self.group
    }

    /// How the group was priced.
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    /// Price of the group.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Instance indexes, ascending.
    pub fn instances(&self) -> &[usize] {
        self.group.instances()
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        self.group.label()
    }
}

/// Which group sizes survive at a recursion level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneRule {
    /// Keep every size from 2 upwards.
    None,

    /// When a group of at least this size can be formed, drop all smaller
    /// groups at that level.
    BelowSize(usize),
}

impl Default for PruneRule {
    fn default() -> Self {
        PruneRule::BelowSize(4)
    }
}

/// Enumerates groups of distinct kinds over the unassigned instances of a basket.
#[derive(Debug, Clone, Copy)]
pub struct GroupGenerator<'a, K: Kind = char> {
    basket: &'a Basket<K>,
    max_size: usize,
    prune: PruneRule,
}

impl<'a, K: Kind> GroupGenerator<'a, K> {
    /// Create a generator producing groups of 2 to `max_size` kinds.
    pub fn new(basket: &'a Basket<K>, max_size: usize, prune: PruneRule) -> Self {
        GroupGenerator {
            basket,
            max_size,
            prune,
        }
    }

    /// Smallest group size produced when `distinct` kinds are available.
    fn min_size(&self, distinct: usize) -> usize {
        let largest = distinct.min(self.max_size);

        match self.prune {
            PruneRule::BelowSize(size) if size > 2 && largest >= size => size,
            _ => 2,
        }
    }

    /// Groups that can be formed from `remaining`.
    ///
    /// Groups come out by size, smallest first, and within a size in
    /// ascending kind order. Each chosen kind is represented by its lowest
    /// remaining instance. Yields nothing when fewer than two kinds remain.
    pub fn groups(&self, remaining: &[usize]) -> impl Iterator<Item = Group<K>> + use<K> {
        let firsts: Vec<(K, usize)> = self.basket.first_instances(remaining).into_iter().collect();
        let largest = firsts.len().min(self.max_size);
        let smallest = self.min_size(firsts.len());

        (smallest..=largest).flat_map(move |size| {
            firsts
                .clone()
                .into_iter()
                .combinations(size)
                .map(Group::from_pairs)
        })
    }
}
