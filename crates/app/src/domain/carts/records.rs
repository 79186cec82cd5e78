//! Cart Records

use jiff::Timestamp;
use storefront::{
    items::{LineItem, LineItemError, LineItemUuid},
    products::ProductUuid,
};

use crate::auth::UserUuid;

/// Cart Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub uuid: LineItemUuid,
    pub user: UserUuid,
    pub product: ProductUuid,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<&CartItemRecord> for LineItem {
    type Error = LineItemError;

    fn try_from(record: &CartItemRecord) -> Result<Self, Self::Error> {
        LineItem::new(record.uuid, record.product, record.quantity)
    }
}
