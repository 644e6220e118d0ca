//! Pricing

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::discounts::DiscountTable;

/// Errors that can occur while building a price list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The unit price is below zero.
    #[error("unit price must not be negative, got {0}")]
    NegativeUnitPrice(Decimal),
}

/// Unit price, currency and discount tiers shared by every kind in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceList {
    unit_price: Decimal,
    currency: &'static Currency,
    discounts: DiscountTable,
}

impl PriceList {
    /// Create a new price list.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeUnitPrice`] if `unit_price` is below zero.
    pub fn new(
        unit_price: Decimal,
        currency: &'static Currency,
        discounts: DiscountTable,
    ) -> Result<Self, PricingError> {
        if unit_price < Decimal::ZERO {
            return Err(PricingError::NegativeUnitPrice(unit_price));
        }

        Ok(PriceList {
            unit_price,
            currency,
            discounts,
        })
    }

    /// The reference price list: 8.00 EUR per item with the reference discount table.
    pub fn reference() -> Self {
        PriceList {
            unit_price: Decimal::new(800, 2),
            currency: iso::EUR,
            discounts: DiscountTable::reference(),
        }
    }

    /// Price of a single item.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Currency used for display.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Discount tiers.
    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }

    /// Largest group the discount table prices.
    pub fn max_group_size(&self) -> usize {
        self.discounts.max_group_size()
    }

    /// Undiscounted price of `count` items.
    pub fn full_price(&self, count: usize) -> Decimal {
        Decimal::from(count) * self.unit_price
    }

    /// Discounted subtotal for a group of `group_size` items spanning
    /// `distinct` kinds. Groups of a single kind cost full price.
    ///
    /// # Panics
    ///
    /// Panics if `distinct` exceeds `group_size` or the table's range. Both
    /// mean the caller built an impossible group.
    pub fn subtotal(&self, group_size: usize, distinct: usize) -> Decimal {
        assert!(
            distinct <= group_size,
            "group of {group_size} items cannot span {distinct} distinct kinds"
        );

        if distinct <= 1 {
            return self.same_kind_subtotal(group_size);
        }

        let fraction = self.discounts.fraction_off(distinct);

        assert!(
            fraction.is_some(),
            "no discount tier for {distinct} distinct kinds (table prices up to {})",
            self.discounts.max_group_size()
        );

        let gross = self.full_price(group_size);

        gross - gross * fraction.unwrap_or(Decimal::ZERO)
    }

    /// Subtotal for a group of pairwise distinct kinds.
    pub fn distinct_subtotal(&self, group_size: usize) -> Decimal {
        if group_size < 2 {
            return self.full_price(group_size);
        }

        self.subtotal(group_size, group_size)
    }

    /// Subtotal for copies of a single kind: repeats never earn a discount.
    pub fn same_kind_subtotal(&self, group_size: usize) -> Decimal {
        self.full_price(group_size)
    }

    /// Wrap an amount in this price list's currency for display.
    pub fn money(&self, amount: Decimal) -> Money<'static, Currency> {
        Money::from_decimal(amount, self.currency)
    }
}

impl Default for PriceList {
    fn default() -> Self {
        Self::reference()
    }
}
