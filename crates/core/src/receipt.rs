//! Receipt

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
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
    items::LineItemError,
    pricing::{AppliedPromotion, PricedCart},
    promotions::PromotionKind,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for line total errors.
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of a priced cart, optionally with the shipping fee charged at checkout.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'p, 'a> {
    priced: &'p PricedCart<'a>,
    shipping_fee: Option<Money<'a, Currency>>,
}

impl<'p, 'a> Receipt<'p, 'a> {
    /// Receipt for a priced cart without shipping.
    #[must_use]
    pub fn new(priced: &'p PricedCart<'a>) -> Self {
        Self {
            priced,
            shipping_fee: None,
        }
    }

    /// Add the shipping fee charged on top of the final total.
    #[must_use]
    pub fn with_shipping(mut self, shipping_fee: Money<'a, Currency>) -> Self {
        self.shipping_fee = Some(shipping_fee);
        self
    }

    /// Final total plus shipping, when shipping is known.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the shipping fee uses another currency.
    pub fn amount_due(&self) -> Result<Money<'a, Currency>, MoneyError> {
        match self.shipping_fee {
            Some(fee) => self.priced.final_total().add(fee),
            None => Ok(self.priced.final_total()),
        }
    }

    /// Writes the receipt tables and summary to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total can't be calculated or the output can't be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_table(&mut out, self.line_table()?)?;

        if !self.priced.applied().is_empty() {
            write_table(&mut out, self.promotion_table())?;
        }

        self.write_summary(&mut out)
    }

    fn line_table(&self) -> Result<Builder, ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Line Total"]);

        for (idx, line) in self.priced.lines().iter().enumerate() {
            let name = line
                .product()
                .map_or_else(|| "<missing product>".to_string(), |p| p.name.clone());

            let total = match line.line_total()? {
                Some(total) => format!("{total}"),
                None => "unavailable".to_string(),
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                name,
                line.quantity().to_string(),
                total,
            ]);
        }

        Ok(builder)
    }

    fn promotion_table(&self) -> Builder {
        let mut builder = Builder::default();

        builder.push_record(["", "Promotion", "Units", "Discount"]);

        for (idx, applied) in self.priced.applied().iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                format!("{} ({})", applied.name, describe(applied)),
                applied.affected_quantity().to_string(),
                format!("-{}", applied.discount),
            ]);
        }

        builder
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows = vec![
            (" Subtotal:", format!("{}  ", self.priced.subtotal())),
            (" Discounts:", format!("-{}  ", self.priced.total_discount())),
            (" Total:", format!("{}  ", self.priced.final_total())),
        ];

        if let Some(fee) = self.shipping_fee {
            rows.push((" Shipping:", format!("{fee}  ")));
            rows.push((" Amount due:", format!("{}  ", self.amount_due()?)));
        }

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, "{label:<label_width$}{value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn describe(applied: &AppliedPromotion<'_>) -> String {
    match applied.kind {
        PromotionKind::FreeItems { free_quantity } => format!(
            "buy {}, get {free_quantity} free; {} free",
            applied.min_quantity, applied.free_quantity
        ),
        PromotionKind::PercentageOff { percentage } => {
            format!("buy {}, {percentage}% off", applied.min_quantity)
        }
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..4), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        ids::{BrandUuid, CategoryUuid},
        items::{CartLine, LineItem, LineItemUuid},
        pricing::price_cart,
        products::{ProductSnapshot, ProductUuid},
        promotions::{Promotion, PromotionScope, PromotionUuid, ValidityWindow},
    };

    use super::*;

    fn priced() -> TestResult<PricedCart<'static>> {
        let product = ProductSnapshot {
            uuid: ProductUuid::new(),
            name: "Oolong".to_string(),
            price: Money::from_minor(1_000, GBP),
            stock: 10,
            active: true,
            category: CategoryUuid::new(),
            brand: BrandUuid::new(),
        };

        let item = LineItem::new(LineItemUuid::new(), product.uuid, 2)?;

        let promotion = Promotion::new(
            PromotionUuid::new(),
            "Tea Time",
            PromotionKind::PercentageOff { percentage: 10 },
            2,
            PromotionScope::All,
            true,
            ValidityWindow::unbounded(),
        )?;

        Ok(price_cart(
            vec![CartLine::new(item, Some(product))],
            &[promotion],
            Timestamp::now(),
            GBP,
        )?)
    }

    #[test]
    fn write_to_lists_lines_promotions_and_totals() -> TestResult {
        let priced = priced()?;
        let mut out = Vec::new();

        Receipt::new(&priced).write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Oolong"));
        assert!(text.contains("Tea Time (buy 2, 10% off)"));
        assert!(text.contains("Subtotal:"));
        assert!(text.contains("£18.00"));
        assert!(!text.contains("Shipping:"));

        Ok(())
    }

    #[test]
    fn shipping_is_added_to_amount_due() -> TestResult {
        let priced = priced()?;
        let receipt = Receipt::new(&priced).with_shipping(Money::from_minor(500, GBP));

        assert_eq!(receipt.amount_due()?, Money::from_minor(2_300, GBP));

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        assert!(String::from_utf8(out)?.contains("Amount due:"));

        Ok(())
    }
}
