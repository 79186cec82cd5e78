//! Promotions Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::promotions::{Promotion, PromotionUuid};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::promotions::{
        PromotionsServiceError, records::PromotionRecord, repository::PgPromotionsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPromotionsService {
    db: Db,
    repository: PgPromotionsRepository,
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromotionsRepository::new(),
        }
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    #[tracing::instrument(name = "promotions.service.list_promotions", skip(self), err)]
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let promotions = self.repository.list_promotions(&mut tx).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.list_effective",
        skip(self),
        fields(point_in_time = %point_in_time),
        err
    )]
    async fn list_effective(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self
            .repository
            .list_effective(&mut tx, point_in_time)
            .await?;

        tx.commit().await?;

        let promotions = records
            .iter()
            .filter_map(|record| match Promotion::try_from(record) {
                Ok(promotion) => Some(promotion),
                Err(error) => {
                    warn!(promotion_uuid = %record.uuid, %error, "skipping malformed promotion");

                    None
                }
            })
            .collect();

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, promotion),
        fields(
            promotion_uuid = %promotion.uuid(),
            promotion_kind = promotion.kind().as_str(),
            promotion_scope = promotion.scope().as_str()
        ),
        err
    )]
    async fn create_promotion(
        &self,
        promotion: Promotion,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_promotion(&mut tx, &promotion).await?;

        tx.commit().await?;

        info!(promotion_uuid = %created.uuid, "created promotion");

        Ok(created)
    }

    #[tracing::instrument(
        name = "promotions.service.set_active",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn set_active(
        &self,
        promotion: PromotionUuid,
        active: bool,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .set_active(&mut tx, promotion, active)
            .await?;

        tx.commit().await?;

        info!(promotion_uuid = %updated.uuid, active, "toggled promotion");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "promotions.service.delete_promotion",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn delete_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<(), PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_promotion(&mut tx, promotion).await?;

        if rows_affected == 0 {
            return Err(PromotionsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(promotion_uuid = %promotion, "deleted promotion");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Retrieves every stored promotion, including inactive and malformed ones.
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError>;

    /// Retrieves the promotions in effect at `point_in_time`.
    ///
    /// Rows that don't describe a valid promotion are logged and left out.
    async fn list_effective(
        &self,
        point_in_time: Timestamp,
    ) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Stores a new promotion.
    async fn create_promotion(
        &self,
        promotion: Promotion,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Switches a promotion on or off.
    async fn set_active(
        &self,
        promotion: PromotionUuid,
        active: bool,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Deletes a promotion.
    async fn delete_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<(), PromotionsServiceError>;
}

#[cfg(test)]
mod tests {
    use storefront::promotions::{PromotionKind, PromotionScope, ValidityWindow};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test::TestContext;

    use super::*;

    const NOW: i64 = 1_790_000_000;

    fn at(second: i64) -> TestResult<Timestamp> {
        Ok(Timestamp::from_second(second)?)
    }

    fn ten_percent_off(
        active: bool,
        starts_at: Option<Timestamp>,
        ends_at: Option<Timestamp>,
    ) -> TestResult<Promotion> {
        Ok(Promotion::new(
            PromotionUuid::new(),
            "10% off everything",
            PromotionKind::PercentageOff { percentage: 10 },
            1,
            PromotionScope::All,
            active,
            ValidityWindow { starts_at, ends_at },
        )?)
    }

    #[tokio::test]
    async fn effective_promotions_respect_inclusive_windows() -> TestResult {
        let ctx = TestContext::new().await;

        let unbounded = ten_percent_off(true, None, None)?;
        let starts_now = ten_percent_off(true, Some(at(NOW)?), None)?;
        let ends_now = ten_percent_off(true, Some(at(NOW - 60)?), Some(at(NOW)?))?;
        let ended = ten_percent_off(true, None, Some(at(NOW - 1)?))?;
        let upcoming = ten_percent_off(true, Some(at(NOW + 1)?), None)?;
        let inactive = ten_percent_off(false, None, None)?;

        for promotion in [
            &unbounded,
            &starts_now,
            &ends_now,
            &ended,
            &upcoming,
            &inactive,
        ] {
            ctx.promotions.create_promotion(promotion.clone()).await?;
        }

        let mut effective: Vec<PromotionUuid> = ctx
            .promotions
            .list_effective(at(NOW)?)
            .await?
            .iter()
            .map(Promotion::uuid)
            .collect();

        effective.sort();

        let mut expected = vec![unbounded.uuid(), starts_now.uuid(), ends_now.uuid()];

        expected.sort();

        assert_eq!(effective, expected);
        assert_eq!(ctx.promotions.list_promotions().await?.len(), 6);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_rows_are_left_out_of_effective_promotions() -> TestResult {
        let ctx = TestContext::new().await;
        let valid = ten_percent_off(true, None, None)?;

        ctx.promotions.create_promotion(valid.clone()).await?;

        for (kind, free_quantity, percentage) in [
            ("free_items", Some(1), Some(50)),
            ("percentage_off", None, None),
            ("bogo", Some(1), None),
        ] {
            sqlx::query(
                "INSERT INTO promotions (uuid, name, kind, min_quantity, free_quantity, percentage)
                 VALUES ($1, 'Broken', $2, 2, $3, $4)",
            )
            .bind(Uuid::now_v7())
            .bind(kind)
            .bind(free_quantity)
            .bind(percentage)
            .execute(ctx.db.pool())
            .await?;
        }

        let effective = ctx.promotions.list_effective(at(NOW)?).await?;

        assert_eq!(effective.len(), 1);
        assert_eq!(effective.first().map(Promotion::uuid), Some(valid.uuid()));
        assert_eq!(ctx.promotions.list_promotions().await?.len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn toggling_off_removes_a_promotion_from_effect() -> TestResult {
        let ctx = TestContext::new().await;
        let promotion = ten_percent_off(true, None, None)?;

        ctx.promotions.create_promotion(promotion.clone()).await?;

        let updated = ctx.promotions.set_active(promotion.uuid(), false).await?;

        assert!(!updated.active);
        assert!(ctx.promotions.list_effective(at(NOW)?).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn deleting_an_unknown_promotion_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.promotions.delete_promotion(PromotionUuid::new()).await;

        assert!(matches!(result, Err(PromotionsServiceError::NotFound)));

        Ok(())
    }
}
