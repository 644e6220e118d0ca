//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use itertools::Itertools;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    basket::Kind,
    groups::{PricedGroup, RowKind},
    optimizer::{Quote, QuoteSource},
    pricing::PriceList,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("IO error")]
    IO(#[from] io::Error),
}

/// One priced group on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Group label, e.g. `"ABCD"`.
    pub label: String,

    /// Basket positions of the grouped items.
    pub items: Vec<usize>,

    /// Undiscounted price of the group.
    pub base_price: Money<'a, Currency>,

    /// Discount applied to the group.
    pub discount: Percentage,

    /// Price actually paid for the group.
    pub price: Money<'a, Currency>,
}

/// Final receipt for a priced basket.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,

    /// Total cost with every item at full price
    subtotal: Money<'a, Currency>,

    /// Total amount paid
    total: Money<'a, Currency>,

    /// Price of the greedy baseline, for comparison
    baseline: Money<'a, Currency>,

    source: QuoteSource,

    currency: &'static Currency,
}

impl Receipt<'static> {
    /// Build a receipt from a quote and the price list it was made with.
    #[must_use]
    pub fn from_quote<K: Kind>(quote: &Quote<K>, prices: &PriceList) -> Self {
        let lines = quote
            .partition()
            .groups()
            .iter()
            .map(|group| receipt_line(group, prices))
            .collect();

        Receipt {
            lines,
            subtotal: prices.money(quote.full_price()),
            total: prices.money(quote.total()),
            baseline: prices.money(quote.baseline_total()),
            source: quote.source(),
            currency: prices.currency(),
        }
    }
}

impl<'a> Receipt<'a> {
    /// Groups on the receipt, in the order they were chosen.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost with every item at full price
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount paid
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Price of the greedy baseline partition
    #[must_use]
    pub fn baseline(&self) -> Money<'a, Currency> {
        self.baseline
    }

    /// Where the total came from.
    #[must_use]
    pub fn source(&self) -> QuoteSource {
        self.source
    }

    /// Currency used for all monetary values
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Amount saved against the subtotal.
    #[must_use]
    pub fn savings(&self) -> Money<'a, Currency> {
        Money::from_decimal(self.subtotal.amount() - self.total.amount(), self.currency)
    }

    /// Savings as a fraction of the subtotal. Zero for an empty basket.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        let subtotal = *self.subtotal.amount();

        if subtotal.is_zero() {
            return Percentage::from(Decimal::ZERO);
        }

        Percentage::from(*self.savings().amount() / subtotal)
    }

    /// Render the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Group", "Items", "Base Price", "Discount", "Price"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let discount = if fraction(line.discount).is_zero() {
                String::new()
            } else {
                format!("-{}%", percent_points(line.discount))
            };

            builder.push_record([
                format!("#{}", idx + 1),
                line.label.clone(),
                line.items.iter().join(", "),
                line.base_price.to_string(),
                discount,
                line.price.to_string(),
            ]);
        }

        write_table(&mut out, builder)?;
        write_summary(&mut out, self)
    }
}

fn receipt_line<K: Kind>(group: &PricedGroup<K>, prices: &PriceList) -> ReceiptLine<'static> {
    let size = group.instances().len();

    let discount = match group.kind() {
        RowKind::Distinct => prices.discounts().percent_off(size),
        RowKind::Residual => None,
    }
    .unwrap_or_else(|| Percentage::from(Decimal::ZERO));

    ReceiptLine {
        label: group.label(),
        items: group.instances().to_vec(),
        base_price: prices.money(prices.full_price(size)),
        discount,
        price: prices.money(group.price()),
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{}", colorize_borders(&table.to_string()))?;

    Ok(())
}

fn write_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let savings = format!(
        "({:.2}%) {}",
        percent_points(receipt.savings_percent()),
        receipt.savings()
    );

    let mut lines = vec![
        ("Subtotal:", receipt.subtotal().to_string()),
        ("Total:", receipt.total().to_string()),
        ("Savings:", savings),
    ];

    if receipt.source() == QuoteSource::Search {
        lines.push(("Greedy:", receipt.baseline().to_string()));
    }

    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in lines {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn fraction(percentage: Percentage) -> Decimal {
    percentage * Decimal::ONE
}

/// `0.25` becomes `25`.
fn percent_points(percentage: Percentage) -> Decimal {
    (fraction(percentage) * Decimal::ONE_HUNDRED).round_dp(2).normalize()
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in dark-grey ANSI codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}
