//! Items

use std::num::NonZeroU32;

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    ids::TypedUuid,
    products::{ProductSnapshot, ProductUuid},
};

/// Line Item UUID
pub type LineItemUuid = TypedUuid<LineItem>;

/// Errors raised while building cart lines.
#[derive(Debug, Error, PartialEq)]
pub enum LineItemError {
    /// Line items must hold at least one unit.
    #[error("line item {0} has zero quantity")]
    ZeroQuantity(LineItemUuid),

    /// Line quantity exceeds what money arithmetic can represent.
    #[error("line item {0} quantity overflowed")]
    QuantityOverflow(LineItemUuid),
}

/// One product and quantity entry in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    uuid: LineItemUuid,
    product: ProductUuid,
    quantity: NonZeroU32,
}

impl LineItem {
    /// Create a new line item.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::ZeroQuantity`] when `quantity` is zero.
    pub fn new(
        uuid: LineItemUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Self, LineItemError> {
        let quantity = NonZeroU32::new(quantity).ok_or(LineItemError::ZeroQuantity(uuid))?;

        Ok(Self {
            uuid,
            product,
            quantity,
        })
    }

    /// Line item identifier
    pub fn uuid(&self) -> LineItemUuid {
        self.uuid
    }

    /// Product this line refers to
    pub fn product(&self) -> ProductUuid {
        self.product
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

/// A line item joined with the current catalog state of its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    item: LineItem,
    product: Option<ProductSnapshot<'a>>,
}

impl<'a> CartLine<'a> {
    /// Join a line item with its product. `None` means the product no longer resolves.
    pub fn new(item: LineItem, product: Option<ProductSnapshot<'a>>) -> Self {
        Self { item, product }
    }

    /// The underlying line item
    pub fn item(&self) -> &LineItem {
        &self.item
    }

    /// Resolved product, if any
    pub fn product(&self) -> Option<&ProductSnapshot<'a>> {
        self.product.as_ref()
    }

    /// Product that is resolvable and active; the only kind that can be priced.
    pub fn sellable_product(&self) -> Option<&ProductSnapshot<'a>> {
        self.product.as_ref().filter(|product| product.active)
    }

    /// Number of units on this line
    pub fn quantity(&self) -> u32 {
        self.item.quantity()
    }

    /// Unit price × quantity, or `None` when the product is not sellable.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::QuantityOverflow`] if the line total can't be represented.
    pub fn line_total(&self) -> Result<Option<Money<'a, Currency>>, LineItemError> {
        let Some(product) = self.sellable_product() else {
            return Ok(None);
        };

        let total = product
            .price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity()))
            .ok_or(LineItemError::QuantityOverflow(self.item.uuid))?;

        Ok(Some(Money::from_minor(total, product.price.currency())))
    }
}

/// Sum line totals for every sellable line, in `currency`.
///
/// # Errors
///
/// Returns a [`MoneyError`] wrapped in [`LineTotalsError`] on currency mismatch, or a
/// [`LineItemError`] if a line total overflows.
pub fn sellable_total<'a>(
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, LineTotalsError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            match line.line_total()? {
                Some(total) => Ok(acc.add(total)?),
                None => Ok(acc),
            }
        })
}

/// Errors that can occur while summing cart lines.
#[derive(Debug, Error, PartialEq)]
pub enum LineTotalsError {
    /// Line level error
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
