//! Promotion effects
//!
//! Turns a fired promotion into free units and a monetary discount.

use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{DiscountError, cheapest_units_total, percent_of_minor, percentage_from_points},
    items::CartLine,
    promotions::{Promotion, PromotionKind, eligibility::Eligibility},
};

/// What a fired promotion grants on one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect<'a> {
    /// Units given away
    pub free_quantity: u64,

    /// Monetary value of the discount
    pub discount: Money<'a, Currency>,
}

impl Effect<'_> {
    /// An effect that neither frees units nor discounts money.
    pub fn is_empty(&self) -> bool {
        self.free_quantity == 0 && self.discount.to_minor_units() == 0
    }
}

/// Calculate the effect of `promotion` over the lines selected by `eligibility`.
///
/// Free items: one set per `min_quantity` in-scope units, each set granting the configured free
/// quantity; the cheapest in-scope units are the ones given away.
///
/// Percentage off: the percentage applies to the whole in-scope total, not only to the units
/// above the threshold.
///
/// A promotion that doesn't fire yields an empty effect.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the discount can't be represented in minor units.
pub fn calculate<'a>(
    promotion: &Promotion,
    eligibility: &Eligibility,
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Effect<'a>, DiscountError> {
    if !eligibility.fires() {
        return Ok(Effect {
            free_quantity: 0,
            discount: Money::from_minor(0, currency),
        });
    }

    let in_scope = || {
        eligibility
            .lines()
            .iter()
            .filter_map(|&idx| lines.get(idx))
            .filter_map(|line| line.sellable_product().map(|product| (line, product)))
    };

    match promotion.kind() {
        PromotionKind::FreeItems { free_quantity } => {
            let eligible_sets = eligibility.total_quantity() / u64::from(promotion.min_quantity());

            let free_quantity = eligible_sets
                .checked_mul(u64::from(free_quantity))
                .ok_or(DiscountError::Overflow)?;

            let units: Vec<(i64, u64)> = in_scope()
                .map(|(line, product)| {
                    (product.price.to_minor_units(), u64::from(line.quantity()))
                })
                .collect();

            let discount = cheapest_units_total(units, free_quantity)?;

            Ok(Effect {
                free_quantity,
                discount: Money::from_minor(discount, currency),
            })
        }
        PromotionKind::PercentageOff { percentage } => {
            let affected_total = in_scope()
                .try_fold(0_i64, |acc, (line, product)| {
                    product
                        .price
                        .to_minor_units()
                        .checked_mul(i64::from(line.quantity()))
                        .and_then(|total| acc.checked_add(total))
                })
                .ok_or(DiscountError::Overflow)?;

            let discount = percent_of_minor(&percentage_from_points(percentage), affected_total)?;

            Ok(Effect {
                free_quantity: 0,
                discount: Money::from_minor(discount, currency),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        ids::{BrandUuid, CategoryUuid},
        items::{LineItem, LineItemUuid},
        products::{ProductSnapshot, ProductUuid},
        promotions::{PromotionScope, PromotionUuid, ValidityWindow, eligibility::resolve},
    };

    use super::*;

    fn line(price: i64, quantity: u32) -> TestResult<CartLine<'static>> {
        let product = ProductSnapshot {
            uuid: ProductUuid::new(),
            name: "Unit".to_string(),
            price: Money::from_minor(price, GBP),
            stock: 100,
            active: true,
            category: CategoryUuid::new(),
            brand: BrandUuid::new(),
        };
        let item = LineItem::new(LineItemUuid::new(), product.uuid, quantity)?;

        Ok(CartLine::new(item, Some(product)))
    }

    fn promotion(kind: PromotionKind, min_quantity: u32) -> TestResult<Promotion> {
        Ok(Promotion::new(
            PromotionUuid::new(),
            "Test",
            kind,
            min_quantity,
            PromotionScope::All,
            true,
            ValidityWindow::unbounded(),
        )?)
    }

    fn effect(promotion: &Promotion, lines: &[CartLine<'static>]) -> TestResult<Effect<'static>> {
        let eligibility = resolve(promotion, lines);

        Ok(calculate(promotion, &eligibility, lines, GBP)?)
    }

    #[test]
    fn free_items_threshold_boundary() -> TestResult {
        let promo = promotion(PromotionKind::FreeItems { free_quantity: 1 }, 3)?;

        assert!(effect(&promo, &[line(100, 2)?])?.is_empty());
        assert_eq!(effect(&promo, &[line(100, 3)?])?.free_quantity, 1);
        assert_eq!(effect(&promo, &[line(100, 5)?])?.free_quantity, 1);
        assert_eq!(effect(&promo, &[line(100, 6)?])?.free_quantity, 2);

        Ok(())
    }

    #[test]
    fn free_items_gives_away_cheapest_units() -> TestResult {
        let promo = promotion(PromotionKind::FreeItems { free_quantity: 1 }, 2)?;
        let lines = [line(20_000, 1)?, line(10_000, 1)?];

        let effect = effect(&promo, &lines)?;

        assert_eq!(effect.free_quantity, 1);
        assert_eq!(effect.discount, Money::from_minor(10_000, GBP));

        Ok(())
    }

    #[test]
    fn free_items_flattens_quantities_into_units() -> TestResult {
        // Buy 2 get 1: 6 units make 3 sets, so the 3 cheapest units (50, 50, 80) are free.
        let promo = promotion(PromotionKind::FreeItems { free_quantity: 1 }, 2)?;
        let lines = [line(80, 2)?, line(50, 2)?, line(300, 2)?];

        let effect = effect(&promo, &lines)?;

        assert_eq!(effect.free_quantity, 3);
        assert_eq!(effect.discount, Money::from_minor(180, GBP));

        Ok(())
    }

    #[test]
    fn free_quantity_can_exceed_units_in_scope() -> TestResult {
        // Buy 1 get 3: the discount is capped at the value of the units in the cart.
        let promo = promotion(PromotionKind::FreeItems { free_quantity: 3 }, 1)?;

        let effect = effect(&promo, &[line(100, 2)?])?;

        assert_eq!(effect.free_quantity, 6);
        assert_eq!(effect.discount, Money::from_minor(200, GBP));

        Ok(())
    }

    #[test]
    fn percentage_applies_to_whole_bundle() -> TestResult {
        let promo = promotion(PromotionKind::PercentageOff { percentage: 10 }, 2)?;

        let exact = effect(&promo, &[line(5_000, 2)?])?;
        let above = effect(&promo, &[line(5_000, 3)?])?;

        assert_eq!(exact.discount, Money::from_minor(1_000, GBP));
        assert_eq!(exact.free_quantity, 0);
        assert_eq!(above.discount, Money::from_minor(1_500, GBP));

        Ok(())
    }

    #[test]
    fn percentage_on_free_products_is_empty() -> TestResult {
        let promo = promotion(PromotionKind::PercentageOff { percentage: 50 }, 1)?;

        assert!(effect(&promo, &[line(0, 4)?])?.is_empty());

        Ok(())
    }
}
