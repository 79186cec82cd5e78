//! Settlement planning
//!
//! Checkout-time view of a priced cart: how many free units each line receives, how much stock
//! each product needs, and whether the catalog can cover it.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::LineItemUuid,
    pricing::{AppliedPromotion, PricedCart},
    products::{ProductSnapshot, ProductUuid},
};

/// Reasons a cart can't be settled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The product behind a line is missing or no longer sellable.
    #[error("product {product} is no longer available")]
    ProductUnavailable {
        /// Line that references the product
        line: LineItemUuid,
        /// Missing or inactive product
        product: ProductUuid,
    },

    /// Not enough stock to cover purchased and free units.
    #[error("only {available} left in stock for {name}")]
    StockConflict {
        /// Product short of stock
        product: ProductUuid,
        /// Product name, for display
        name: String,
        /// Units needed, including free units
        requested: u64,
        /// Units in stock
        available: u32,
    },

    /// A free-unit share doesn't fit the quantity type.
    #[error("free quantity for line {0} overflowed")]
    Overflow(LineItemUuid),
}

/// Share of a promotion's free units attributed to one affected line.
///
/// Each line receives `floor(free_quantity × line quantity / affected quantity)`. Flooring can
/// leave units unassigned; they are not redistributed.
pub fn free_shares(applied: &AppliedPromotion<'_>) -> Vec<(LineItemUuid, u64)> {
    let affected_quantity = u128::from(applied.affected_quantity());

    if affected_quantity == 0 {
        return Vec::new();
    }

    applied
        .affected_lines
        .iter()
        .map(|line| {
            let share = u128::from(applied.free_quantity) * u128::from(line.quantity)
                / affected_quantity;

            (line.line, u64::try_from(share).unwrap_or(u64::MAX))
        })
        .collect()
}

/// A cart line as it will be written to an order.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementLine<'a> {
    /// Source cart line
    pub line: LineItemUuid,

    /// Product purchased
    pub product: ProductUuid,

    /// Paid units
    pub quantity: u32,

    /// Free units attributed to this line across all promotions
    pub free_quantity: u32,

    /// Unit price at settlement time
    pub unit_price: Money<'a, Currency>,
}

impl SettlementLine<'_> {
    /// Units leaving stock for this line.
    pub fn units(&self) -> u64 {
        u64::from(self.quantity) + u64::from(self.free_quantity)
    }
}

/// Units a product must give up for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequirement {
    /// Product to decrement
    pub product: ProductUuid,

    /// Units needed across every line of the product
    pub units: u32,
}

/// Validated plan for persisting a priced cart as an order.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan<'a> {
    lines: Vec<SettlementLine<'a>>,
    stock: Vec<StockRequirement>,
}

impl<'a> SettlementPlan<'a> {
    /// Order lines, in cart order
    pub fn lines(&self) -> &[SettlementLine<'a>] {
        &self.lines
    }

    /// Stock decrements, one per product, in first-seen order
    pub fn stock(&self) -> &[StockRequirement] {
        &self.stock
    }
}

/// Allocate free units and check stock for every line of `priced`.
///
/// # Errors
///
/// Returns [`SettlementError::ProductUnavailable`] when a line's product is missing or inactive,
/// or [`SettlementError::StockConflict`] when a product can't cover its paid and free units.
pub fn plan<'a>(priced: &PricedCart<'a>) -> Result<SettlementPlan<'a>, SettlementError> {
    let mut free_by_line: FxHashMap<LineItemUuid, u64> = FxHashMap::default();

    for applied in priced.applied() {
        for (line, share) in free_shares(applied) {
            let entry = free_by_line.entry(line).or_default();
            *entry = entry.saturating_add(share);
        }
    }

    let mut lines = Vec::with_capacity(priced.lines().len());
    let mut needs: Vec<(&ProductSnapshot<'a>, u64)> = Vec::new();

    for cart_line in priced.lines() {
        let item = cart_line.item();

        let product = cart_line
            .sellable_product()
            .ok_or(SettlementError::ProductUnavailable {
                line: item.uuid(),
                product: item.product(),
            })?;

        let free_quantity = free_by_line.get(&item.uuid()).copied().unwrap_or_default();
        let free_quantity =
            u32::try_from(free_quantity).map_err(|_err| SettlementError::Overflow(item.uuid()))?;

        let line = SettlementLine {
            line: item.uuid(),
            product: product.uuid,
            quantity: item.quantity(),
            free_quantity,
            unit_price: product.price,
        };

        match needs.iter_mut().find(|(seen, _)| seen.uuid == product.uuid) {
            Some((_, units)) => *units = units.saturating_add(line.units()),
            None => needs.push((product, line.units())),
        }

        lines.push(line);
    }

    let mut stock = Vec::with_capacity(needs.len());

    for (product, requested) in needs {
        let units = u32::try_from(requested)
            .ok()
            .filter(|&units| units <= product.stock)
            .ok_or_else(|| SettlementError::StockConflict {
                product: product.uuid,
                name: product.name.clone(),
                requested,
                available: product.stock,
            })?;

        stock.push(StockRequirement {
            product: product.uuid,
            units,
        });
    }

    Ok(SettlementPlan { lines, stock })
}
