//! Products

use rusty_money::{Money, iso::Currency};

use crate::ids::{BrandUuid, CategoryUuid, TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductSnapshot<'static>>;

/// Catalog state of a product at the moment a cart is priced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot<'a> {
    /// Product identifier
    pub uuid: ProductUuid,

    /// Product name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Units available for sale
    pub stock: u32,

    /// Whether the product is currently sellable
    pub active: bool,

    /// Owning category
    pub category: CategoryUuid,

    /// Owning brand
    pub brand: BrandUuid,
}

impl ProductSnapshot<'_> {
    /// Whether `quantity` units can be taken from stock.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn has_stock_for_is_inclusive() {
        let product = ProductSnapshot {
            uuid: ProductUuid::new(),
            name: "Kettle".to_string(),
            price: Money::from_minor(2_500, GBP),
            stock: 3,
            active: true,
            category: CategoryUuid::new(),
            brand: BrandUuid::new(),
        };

        assert!(product.has_stock_for(3));
        assert!(!product.has_stock_for(4));
    }
}
