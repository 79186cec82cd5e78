//! Cart pricing
//!
//! Runs every effective promotion over a cart, independently of one another, and assembles the
//! priced result. Promotions stack: there's no exclusivity, priority or cap between them.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::DiscountError,
    items::{CartLine, LineItemUuid, LineTotalsError, sellable_total},
    promotions::{Promotion, PromotionKind, PromotionUuid, effects, eligibility},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Error summing line totals.
    #[error(transparent)]
    LineTotals(#[from] LineTotalsError),

    /// Error calculating a promotion's effect.
    #[error("promotion {promotion}: {source}")]
    Discount {
        /// Promotion being evaluated
        promotion: PromotionUuid,
        /// Underlying discount error
        #[source]
        source: DiscountError,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A cart line touched by a promotion, with the quantity it contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedLine {
    /// Line item identifier
    pub line: LineItemUuid,

    /// Quantity on the line when the promotion was evaluated
    pub quantity: u32,
}

/// One promotion's effect on one evaluation of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion<'a> {
    /// Promotion identifier
    pub promotion: PromotionUuid,

    /// Promotion name at evaluation time
    pub name: String,

    /// Promotion kind at evaluation time
    pub kind: PromotionKind,

    /// Threshold at evaluation time
    pub min_quantity: u32,

    /// In-scope lines
    pub affected_lines: SmallVec<[AffectedLine; 8]>,

    /// Units given away
    pub free_quantity: u64,

    /// Monetary value of the discount
    pub discount: Money<'a, Currency>,
}

impl AppliedPromotion<'_> {
    /// Sum of quantities across affected lines.
    pub fn affected_quantity(&self) -> u64 {
        self.affected_lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }
}

/// The priced result of a cart evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart<'a> {
    lines: Vec<CartLine<'a>>,
    unavailable: SmallVec<[LineItemUuid; 4]>,
    subtotal: Money<'a, Currency>,
    applied: Vec<AppliedPromotion<'a>>,
    total_discount: Money<'a, Currency>,
    final_total: Money<'a, Currency>,
}

impl<'a> PricedCart<'a> {
    /// Lines that were priced, in cart order
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Lines whose product is missing or inactive; they contribute nothing
    pub fn unavailable(&self) -> &[LineItemUuid] {
        &self.unavailable
    }

    /// Total of sellable lines before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Promotions that produced an effect, in evaluation order
    pub fn applied(&self) -> &[AppliedPromotion<'a>] {
        &self.applied
    }

    /// Sum of applied discounts
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Amount payable: subtotal minus discounts, never below zero
    pub fn final_total(&self) -> Money<'a, Currency> {
        self.final_total
    }

    /// Currency used for all monetary values
    pub fn currency(&self) -> &'a Currency {
        self.subtotal.currency()
    }

    /// Whether the cart has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Price a cart against a set of promotions.
///
/// Promotions that aren't effective at `now` are skipped, as are promotions that don't fire or
/// that fire without any effect. Lines whose product is missing or inactive are priced at zero
/// and reported in [`PricedCart::unavailable`].
///
/// # Errors
///
/// Returns a [`PricingError`] when money arithmetic fails, e.g. a product priced in another
/// currency or an amount that overflows.
pub fn price_cart<'a>(
    lines: Vec<CartLine<'a>>,
    promotions: &[Promotion],
    now: Timestamp,
    currency: &'a Currency,
) -> Result<PricedCart<'a>, PricingError> {
    let subtotal = sellable_total(&lines, currency)?;

    let unavailable = lines
        .iter()
        .filter(|line| line.sellable_product().is_none())
        .map(|line| line.item().uuid())
        .collect();

    let mut applied = Vec::new();

    for promotion in promotions.iter().filter(|p| p.is_effective(now)) {
        let eligibility = eligibility::resolve(promotion, &lines);

        if !eligibility.fires() {
            continue;
        }

        let effect = effects::calculate(promotion, &eligibility, &lines, currency).map_err(
            |source| PricingError::Discount {
                promotion: promotion.uuid(),
                source,
            },
        )?;

        if effect.is_empty() {
            continue;
        }

        let affected_lines = eligibility
            .lines()
            .iter()
            .filter_map(|&idx| lines.get(idx))
            .map(|line| AffectedLine {
                line: line.item().uuid(),
                quantity: line.quantity(),
            })
            .collect();

        applied.push(AppliedPromotion {
            promotion: promotion.uuid(),
            name: promotion.name().to_string(),
            kind: promotion.kind(),
            min_quantity: promotion.min_quantity(),
            affected_lines,
            free_quantity: effect.free_quantity,
            discount: effect.discount,
        });
    }

    let total_discount = applied
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, applied| {
            acc.add(applied.discount)
        })?;

    let final_total = Money::from_minor(
        subtotal
            .to_minor_units()
            .saturating_sub(total_discount.to_minor_units())
            .max(0),
        currency,
    );

    Ok(PricedCart {
        lines,
        unavailable,
        subtotal,
        applied,
        total_discount,
        final_total,
    })
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        ids::{BrandUuid, CategoryUuid},
        items::LineItem,
        products::{ProductSnapshot, ProductUuid},
        promotions::{PromotionScope, ValidityWindow},
    };

    use super::*;

    fn product(price: i64, category: CategoryUuid) -> ProductSnapshot<'static> {
        ProductSnapshot {
            uuid: ProductUuid::new(),
            name: "Product".to_string(),
            price: Money::from_minor(price, GBP),
            stock: 50,
            active: true,
            category,
            brand: BrandUuid::new(),
        }
    }

    fn line(product: ProductSnapshot<'static>, quantity: u32) -> TestResult<CartLine<'static>> {
        let item = LineItem::new(LineItemUuid::new(), product.uuid, quantity)?;

        Ok(CartLine::new(item, Some(product)))
    }

    fn promotion(
        kind: PromotionKind,
        min_quantity: u32,
        scope: PromotionScope,
    ) -> TestResult<Promotion> {
        Ok(Promotion::new(
            PromotionUuid::new(),
            kind.as_str(),
            kind,
            min_quantity,
            scope,
            true,
            ValidityWindow::unbounded(),
        )?)
    }

    #[test]
    fn empty_cart_prices_to_zero() -> TestResult {
        let priced = price_cart(Vec::new(), &[], Timestamp::now(), GBP)?;

        assert!(priced.is_empty());
        assert_eq!(priced.subtotal(), Money::from_minor(0, GBP));
        assert_eq!(priced.final_total(), Money::from_minor(0, GBP));
        assert!(priced.applied().is_empty());

        Ok(())
    }

    #[test]
    fn promotions_apply_independently_and_cumulatively() -> TestResult {
        let category_a = CategoryUuid::new();
        let lines = vec![
            line(product(1_000, category_a), 2)?,
            line(product(3_000, CategoryUuid::new()), 1)?,
        ];
        let promotions = [
            promotion(
                PromotionKind::FreeItems { free_quantity: 1 },
                2,
                PromotionScope::Category(category_a),
            )?,
            promotion(
                PromotionKind::PercentageOff { percentage: 10 },
                1,
                PromotionScope::All,
            )?,
        ];

        let priced = price_cart(lines, &promotions, Timestamp::now(), GBP)?;

        assert_eq!(priced.subtotal(), Money::from_minor(5_000, GBP));
        assert_eq!(priced.applied().len(), 2);
        assert_eq!(
            priced.applied().first().map(|a| a.discount),
            Some(Money::from_minor(1_000, GBP))
        );
        assert_eq!(
            priced.applied().get(1).map(|a| a.discount),
            Some(Money::from_minor(500, GBP))
        );
        assert_eq!(priced.total_discount(), Money::from_minor(1_500, GBP));
        assert_eq!(priced.final_total(), Money::from_minor(3_500, GBP));

        Ok(())
    }

    #[test]
    fn final_total_is_clamped_at_zero() -> TestResult {
        let lines = vec![line(product(1_000, CategoryUuid::new()), 1)?];
        let promotions = [
            promotion(
                PromotionKind::PercentageOff { percentage: 100 },
                1,
                PromotionScope::All,
            )?,
            promotion(
                PromotionKind::FreeItems { free_quantity: 1 },
                1,
                PromotionScope::All,
            )?,
        ];

        let priced = price_cart(lines, &promotions, Timestamp::now(), GBP)?;

        assert_eq!(priced.total_discount(), Money::from_minor(2_000, GBP));
        assert_eq!(priced.final_total(), Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn ineffective_promotions_are_skipped() -> TestResult {
        let now = Timestamp::now();
        let expired = Promotion::new(
            PromotionUuid::new(),
            "Expired",
            PromotionKind::PercentageOff { percentage: 50 },
            1,
            PromotionScope::All,
            true,
            ValidityWindow {
                starts_at: None,
                ends_at: Some(now.checked_sub(1.hour())?),
            },
        )?;

        let priced = price_cart(
            vec![line(product(1_000, CategoryUuid::new()), 1)?],
            &[expired],
            now,
            GBP,
        )?;

        assert!(priced.applied().is_empty());
        assert_eq!(priced.final_total(), Money::from_minor(1_000, GBP));

        Ok(())
    }

    #[test]
    fn unavailable_lines_are_flagged_and_unpriced() -> TestResult {
        let mut inactive = product(700, CategoryUuid::new());
        inactive.active = false;

        let missing = LineItem::new(LineItemUuid::new(), ProductUuid::new(), 1)?;
        let inactive_line = line(inactive, 1)?;
        let inactive_uuid = inactive_line.item().uuid();

        let lines = vec![
            line(product(300, CategoryUuid::new()), 1)?,
            inactive_line,
            CartLine::new(missing, None),
        ];

        let priced = price_cart(lines, &[], Timestamp::now(), GBP)?;

        assert_eq!(priced.subtotal(), Money::from_minor(300, GBP));
        assert_eq!(priced.unavailable(), &[inactive_uuid, missing.uuid()]);

        Ok(())
    }

    #[test]
    fn affected_lines_record_quantities() -> TestResult {
        let lines = vec![
            line(product(100, CategoryUuid::new()), 1)?,
            line(product(100, CategoryUuid::new()), 2)?,
        ];
        let promotions = [promotion(
            PromotionKind::FreeItems { free_quantity: 3 },
            3,
            PromotionScope::All,
        )?];

        let priced = price_cart(lines, &promotions, Timestamp::now(), GBP)?;
        let applied = priced
            .applied()
            .first()
            .ok_or("expected an applied promotion")?;

        assert_eq!(applied.affected_quantity(), 3);
        assert_eq!(applied.free_quantity, 3);
        assert_eq!(
            applied
                .affected_lines
                .iter()
                .map(|l| l.quantity)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_an_error() -> TestResult {
        let mut foreign = product(100, CategoryUuid::new());
        foreign.price = Money::from_minor(100, USD);

        let result = price_cart(vec![line(foreign, 1)?], &[], Timestamp::now(), GBP);

        assert!(matches!(result, Err(PricingError::LineTotals(_))));

        Ok(())
    }
}
