//! Order Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::TryFromIntError,
    str::FromStr,
};

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use storefront::{
    ids::TypedUuid,
    items::LineItemUuid,
    pricing::PricedCart,
    products::ProductUuid,
    promotions::PromotionUuid,
    settlement::{SettlementPlan, StockRequirement},
};
use thiserror::Error;

use crate::{auth::UserUuid, domain::checkout::ShippingDetails};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status {0:?}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "packed" => Ok(Self::Packed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownOrderStatus(s.to_string())),
        }
    }
}

/// Order line as purchased. Prices are in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub uuid: LineItemUuid,
    pub product: ProductUuid,
    pub quantity: u32,
    pub free_quantity: u32,
    pub unit_price: u64,
}

/// Applied promotion frozen onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDiscount {
    pub promotion: PromotionUuid,
    pub name: String,
    pub kind: String,
    pub min_quantity: u32,
    pub free_quantity: u64,
    pub discount: u64,
}

/// Order header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub status: OrderStatus,
    pub currency: String,
    pub subtotal: u64,
    pub total_discount: u64,
    pub final_total: u64,
    pub shipping_fee: u64,
    pub amount_due: u64,
    pub shipping: ShippingDetails,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order with its lines and discounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    #[serde(flatten)]
    pub record: OrderRecord,
    pub lines: Vec<OrderLine>,
    pub discounts: Vec<OrderDiscount>,
}

/// Everything needed to write an order in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub currency: &'static str,
    pub subtotal: u64,
    pub total_discount: u64,
    pub final_total: u64,
    pub shipping_fee: u64,
    pub amount_due: u64,
    pub shipping: ShippingDetails,
    pub lines: Vec<OrderLine>,
    pub discounts: Vec<OrderDiscount>,
    pub stock: Vec<StockRequirement>,
}

fn minor(amount: Money<'_, Currency>) -> Result<u64, TryFromIntError> {
    u64::try_from(amount.to_minor_units())
}

impl NewOrder {
    /// Freeze a priced cart and its settlement plan into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if any amount is negative.
    pub fn freeze(
        user: UserUuid,
        priced: &PricedCart<'_>,
        plan: &SettlementPlan<'_>,
        shipping_fee: Money<'_, Currency>,
        shipping: ShippingDetails,
    ) -> Result<Self, TryFromIntError> {
        let final_total = minor(priced.final_total())?;
        let shipping_fee = minor(shipping_fee)?;

        let lines = plan
            .lines()
            .iter()
            .map(|line| {
                Ok(OrderLine {
                    uuid: line.line,
                    product: line.product,
                    quantity: line.quantity,
                    free_quantity: line.free_quantity,
                    unit_price: minor(line.unit_price)?,
                })
            })
            .collect::<Result<Vec<_>, TryFromIntError>>()?;

        let discounts = priced
            .applied()
            .iter()
            .map(|applied| {
                Ok(OrderDiscount {
                    promotion: applied.promotion,
                    name: applied.name.clone(),
                    kind: applied.kind.as_str().to_string(),
                    min_quantity: applied.min_quantity,
                    free_quantity: applied.free_quantity,
                    discount: minor(applied.discount)?,
                })
            })
            .collect::<Result<Vec<_>, TryFromIntError>>()?;

        Ok(Self {
            uuid: OrderUuid::new(),
            user,
            currency: priced.currency().iso_alpha_code,
            subtotal: minor(priced.subtotal())?,
            total_discount: minor(priced.total_discount())?,
            final_total,
            shipping_fee,
            amount_due: final_total.saturating_add(shipping_fee),
            shipping,
            lines,
            discounts,
            stock: plan.stock().to_vec(),
        })
    }
}
