//! Promotions Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::promotions::{Promotion, PromotionKind, PromotionUuid};

use crate::domain::promotions::records::{PromotionRecord, scope_target};

const LIST_PROMOTIONS_SQL: &str = include_str!("sql/list_promotions.sql");
const LIST_EFFECTIVE_PROMOTIONS_SQL: &str = include_str!("sql/list_effective_promotions.sql");
const CREATE_PROMOTION_SQL: &str = include_str!("sql/create_promotion.sql");
const SET_PROMOTION_ACTIVE_SQL: &str = include_str!("sql/set_promotion_active.sql");
const DELETE_PROMOTION_SQL: &str = include_str!("sql/delete_promotion.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromotionsRepository;

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_promotions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_effective(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        point_in_time: Timestamp,
    ) -> Result<Vec<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(LIST_EFFECTIVE_PROMOTIONS_SQL)
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: &Promotion,
    ) -> Result<PromotionRecord, sqlx::Error> {
        let (free_quantity, percentage) = match promotion.kind() {
            PromotionKind::FreeItems { free_quantity } => {
                let free_quantity =
                    i32::try_from(free_quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

                (Some(free_quantity), None)
            }
            PromotionKind::PercentageOff { percentage } => (None, Some(i32::from(percentage))),
        };

        let min_quantity = i32::try_from(promotion.min_quantity())
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let window = promotion.window();

        query_as::<Postgres, PromotionRecord>(CREATE_PROMOTION_SQL)
            .bind(promotion.uuid().into_uuid())
            .bind(promotion.name())
            .bind(promotion.kind().as_str())
            .bind(min_quantity)
            .bind(free_quantity)
            .bind(percentage)
            .bind(promotion.scope().as_str())
            .bind(scope_target(promotion.scope()))
            .bind(promotion.is_active())
            .bind(window.starts_at.map(SqlxTimestamp::from))
            .bind(window.ends_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        active: bool,
    ) -> Result<PromotionRecord, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(SET_PROMOTION_ACTIVE_SQL)
            .bind(promotion.into_uuid())
            .bind(active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_PROMOTION_SQL)
            .bind(promotion.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for PromotionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            min_quantity: row.try_get("min_quantity")?,
            free_quantity: row.try_get("free_quantity")?,
            percentage: row.try_get("percentage")?,
            applies_to: row.try_get("applies_to")?,
            target: row.try_get("target_uuid")?,
            active: row.try_get("is_active")?,
            starts_at: row
                .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                .map(SqlxTimestamp::to_jiff),
            ends_at: row
                .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
