//! Orders Repository

use std::num::TryFromIntError;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::{
    items::LineItemUuid, products::ProductUuid, promotions::PromotionUuid,
    settlement::StockRequirement,
};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    domain::{
        checkout::ShippingDetails,
        orders::records::{NewOrder, OrderDiscount, OrderLine, OrderRecord, OrderStatus, OrderUuid},
        try_get_amount, try_get_count,
    },
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_ITEM_SQL: &str = include_str!("sql/insert_order_item.sql");
const INSERT_ORDER_DISCOUNT_SQL: &str = include_str!("sql/insert_order_discount.sql");
const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");
const LIST_ORDER_DISCOUNTS_SQL: &str = include_str!("sql/list_order_discounts.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");

fn encode_amount(amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn encode_count<T>(count: T) -> Result<i32, sqlx::Error>
where
    i32: TryFrom<T, Error = TryFromIntError>,
{
    i32::try_from(count).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user.into_uuid())
            .bind(order.currency)
            .bind(encode_amount(order.subtotal)?)
            .bind(encode_amount(order.total_discount)?)
            .bind(encode_amount(order.final_total)?)
            .bind(encode_amount(order.shipping_fee)?)
            .bind(encode_amount(order.amount_due)?)
            .bind(&order.shipping.full_name)
            .bind(&order.shipping.phone)
            .bind(&order.shipping.address)
            .bind(order.shipping.notes.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn insert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        line: &OrderLine,
        position: usize,
    ) -> Result<OrderLine, sqlx::Error> {
        query_as::<Postgres, OrderLine>(INSERT_ORDER_ITEM_SQL)
            .bind(line.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(line.product.into_uuid())
            .bind(encode_count(line.quantity)?)
            .bind(encode_count(line.free_quantity)?)
            .bind(encode_amount(line.unit_price)?)
            .bind(encode_count(position)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn insert_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        discount: &OrderDiscount,
        position: usize,
    ) -> Result<OrderDiscount, sqlx::Error> {
        query_as::<Postgres, OrderDiscount>(INSERT_ORDER_DISCOUNT_SQL)
            .bind(Uuid::now_v7())
            .bind(order.into_uuid())
            .bind(discount.promotion.into_uuid())
            .bind(&discount.name)
            .bind(&discount.kind)
            .bind(encode_count(discount.min_quantity)?)
            .bind(encode_amount(discount.free_quantity)?)
            .bind(encode_amount(discount.discount)?)
            .bind(encode_count(position)?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Take units out of stock, returning whether the product could cover them.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        requirement: StockRequirement,
    ) -> Result<bool, sqlx::Error> {
        let result = query(RESERVE_STOCK_SQL)
            .bind(requirement.product.into_uuid())
            .bind(encode_count(requirement.units)?)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Fetch an order header, limited to `owner`'s orders when given.
    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        owner: Option<UserUuid>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(owner.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        query_as::<Postgres, OrderLine>(LIST_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_discounts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderDiscount>, sqlx::Error> {
        query_as::<Postgres, OrderDiscount>(LIST_ORDER_DISCOUNTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            currency: row.try_get("currency")?,
            subtotal: try_get_amount(row, "subtotal")?,
            total_discount: try_get_amount(row, "total_discount")?,
            final_total: try_get_amount(row, "final_total")?,
            shipping_fee: try_get_amount(row, "shipping_fee")?,
            amount_due: try_get_amount(row, "amount_due")?,
            shipping: ShippingDetails {
                full_name: row.try_get("full_name")?,
                phone: row.try_get("phone")?,
                address: row.try_get("address")?,
                notes: row.try_get("notes")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: LineItemUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_count(row, "quantity")?,
            free_quantity: try_get_count(row, "free_quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderDiscount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            promotion: PromotionUuid::from_uuid(row.try_get("promotion_uuid")?),
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            min_quantity: try_get_count(row, "min_quantity")?,
            free_quantity: try_get_amount(row, "free_quantity")?,
            discount: try_get_amount(row, "discount")?,
        })
    }
}
