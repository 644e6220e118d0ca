//! Discounts
//!
//! A [`DiscountTable`] maps the number of distinct kinds in a group to the
//! fraction taken off that group's gross price. Index `n` of the table is the
//! discount for a group of `n` distinct kinds, so the table's length bounds
//! the largest group the engine will ever form.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

/// Errors specific to discount tables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// The table must cover groups of zero, one and two distinct kinds.
    #[error("discount table needs at least 3 tiers (0, 1 and 2 distinct kinds), found {found}")]
    TooFewTiers {
        /// Number of tiers supplied
        found: usize,
    },

    /// A tier's percentage is outside `0%..=100%`.
    #[error("discount for {distinct} distinct kinds must be between 0% and 100%, got {fraction}")]
    OutOfRange {
        /// Distinct-kind count of the offending tier
        distinct: usize,

        /// The offending fraction (e.g. `1.5` for 150%)
        fraction: Decimal,
    },

    /// Groups of zero or one kind are never discounted, so their tiers must be 0%.
    #[error("groups of {distinct} distinct kinds are never discounted, got {fraction}")]
    SingleKindDiscount {
        /// Distinct-kind count of the offending tier
        distinct: usize,

        /// The offending fraction
        fraction: Decimal,
    },
}

/// Percent-off per distinct-kind count.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountTable {
    tiers: SmallVec<[Percentage; 8]>,
}

impl DiscountTable {
    /// Create a table from fractional tiers, indexed by distinct-kind count.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::TooFewTiers`]: fewer than three tiers were supplied.
    /// - [`DiscountError::OutOfRange`]: a tier is negative or above 100%.
    /// - [`DiscountError::SingleKindDiscount`]: the 0 or 1 distinct-kind tier
    ///   is not 0%.
    pub fn new(tiers: impl IntoIterator<Item = Percentage>) -> Result<Self, DiscountError> {
        let tiers: SmallVec<[Percentage; 8]> = tiers.into_iter().collect();

        if tiers.len() < 3 {
            return Err(DiscountError::TooFewTiers { found: tiers.len() });
        }

        tiers
            .iter()
            .enumerate()
            .try_for_each(|(distinct, tier)| {
                let fraction = fraction_of(*tier);

                if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                    Err(DiscountError::OutOfRange { distinct, fraction })
                } else if distinct < 2 && !fraction.is_zero() {
                    Err(DiscountError::SingleKindDiscount { distinct, fraction })
                } else {
                    Ok(())
                }
            })?;

        Ok(DiscountTable { tiers })
    }

    /// Create a table from whole percent points, e.g. `[0, 0, 5, 10, 20, 25]`.
    ///
    /// # Errors
    ///
    /// See [`DiscountTable::new`].
    pub fn from_percent_points(points: &[u32]) -> Result<Self, DiscountError> {
        Self::new(
            points
                .iter()
                .map(|points| Percentage::from(Decimal::from(*points) / Decimal::ONE_HUNDRED)),
        )
    }

    /// The reference table: 0, 0, 5, 10, 20 and 25 percent off.
    pub fn reference() -> Self {
        let tiers = [0u32, 0, 5, 10, 20, 25]
            .into_iter()
            .map(|points| Percentage::from(Decimal::from(points) / Decimal::ONE_HUNDRED))
            .collect();

        DiscountTable { tiers }
    }

    /// Discount for a group of `distinct` kinds, if the table covers it.
    pub fn percent_off(&self, distinct: usize) -> Option<Percentage> {
        self.tiers.get(distinct).copied()
    }

    /// Discount for a group of `distinct` kinds as a plain decimal fraction.
    pub fn fraction_off(&self, distinct: usize) -> Option<Decimal> {
        self.percent_off(distinct).map(fraction_of)
    }

    /// Largest number of distinct kinds the table prices.
    pub fn max_group_size(&self) -> usize {
        self.tiers.len().saturating_sub(1)
    }

    /// Number of tiers, including the zero and one distinct-kind tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Tables are never empty once constructed.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self::reference()
    }
}

// decimal_percentage doesn't expose the underlying Decimal
fn fraction_of(percent: Percentage) -> Decimal {
    percent * Decimal::ONE
}
