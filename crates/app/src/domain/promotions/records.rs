//! Promotion Records

use jiff::Timestamp;
use storefront::{
    ids::{BrandUuid, CategoryUuid},
    products::ProductUuid,
    promotions::{
        Promotion, PromotionError, PromotionKind, PromotionScope, PromotionUuid, ValidityWindow,
    },
};
use thiserror::Error;
use uuid::Uuid;

/// Reasons a stored promotion row can't be used for pricing.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidPromotion {
    #[error("unknown promotion kind {0:?}")]
    UnknownKind(String),

    #[error("unknown scope {0:?}")]
    UnknownScope(String),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),

    #[error("{0} doesn't apply to this kind of promotion")]
    ConflictingPayload(&'static str),

    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

/// Promotion Record
///
/// Columns as stored. Rows are only checked when they're turned into a [`Promotion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRecord {
    pub uuid: PromotionUuid,
    pub name: String,
    pub kind: String,
    pub min_quantity: i32,
    pub free_quantity: Option<i32>,
    pub percentage: Option<i32>,
    pub applies_to: String,
    pub target: Option<Uuid>,
    pub active: bool,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PromotionRecord {
    fn kind(&self) -> Result<PromotionKind, InvalidPromotion> {
        match self.kind.as_str() {
            "free_items" => {
                if self.percentage.is_some() {
                    return Err(InvalidPromotion::ConflictingPayload("percentage"));
                }

                let free_quantity = self
                    .free_quantity
                    .ok_or(InvalidPromotion::Missing("free_quantity"))?;

                Ok(PromotionKind::FreeItems {
                    free_quantity: u32::try_from(free_quantity)
                        .map_err(|_e| InvalidPromotion::OutOfRange("free_quantity"))?,
                })
            }
            "percentage_off" => {
                if self.free_quantity.is_some() {
                    return Err(InvalidPromotion::ConflictingPayload("free_quantity"));
                }

                let percentage = self
                    .percentage
                    .ok_or(InvalidPromotion::Missing("percentage"))?;

                Ok(PromotionKind::PercentageOff {
                    percentage: u8::try_from(percentage)
                        .map_err(|_e| InvalidPromotion::OutOfRange("percentage"))?,
                })
            }
            other => Err(InvalidPromotion::UnknownKind(other.to_string())),
        }
    }

    fn scope(&self) -> Result<PromotionScope, InvalidPromotion> {
        let target = || self.target.ok_or(InvalidPromotion::Missing("target_uuid"));

        match self.applies_to.as_str() {
            "all" => Ok(PromotionScope::All),
            "category" => Ok(PromotionScope::Category(CategoryUuid::from_uuid(target()?))),
            "brand" => Ok(PromotionScope::Brand(BrandUuid::from_uuid(target()?))),
            "product" => Ok(PromotionScope::Product(ProductUuid::from_uuid(target()?))),
            other => Err(InvalidPromotion::UnknownScope(other.to_string())),
        }
    }
}

impl TryFrom<&PromotionRecord> for Promotion {
    type Error = InvalidPromotion;

    fn try_from(record: &PromotionRecord) -> Result<Self, Self::Error> {
        let min_quantity = u32::try_from(record.min_quantity)
            .map_err(|_e| InvalidPromotion::OutOfRange("min_quantity"))?;

        Ok(Promotion::new(
            record.uuid,
            record.name.clone(),
            record.kind()?,
            min_quantity,
            record.scope()?,
            record.active,
            ValidityWindow {
                starts_at: record.starts_at,
                ends_at: record.ends_at,
            },
        )?)
    }
}

/// Target column for a scope, `None` for store-wide promotions.
pub(crate) fn scope_target(scope: PromotionScope) -> Option<Uuid> {
    match scope {
        PromotionScope::All => None,
        PromotionScope::Category(category) => Some(category.into_uuid()),
        PromotionScope::Brand(brand) => Some(brand.into_uuid()),
        PromotionScope::Product(product) => Some(product.into_uuid()),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn record(kind: &str) -> PromotionRecord {
        let (free_quantity, percentage) = match kind {
            "free_items" => (Some(1), None),
            "percentage_off" => (None, Some(10)),
            _ => (None, None),
        };

        PromotionRecord {
            uuid: PromotionUuid::new(),
            name: "Tea bundle".to_string(),
            kind: kind.to_string(),
            min_quantity: 3,
            free_quantity,
            percentage,
            applies_to: "category".to_string(),
            target: Some(Uuid::now_v7()),
            active: true,
            starts_at: None,
            ends_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn free_items_row_becomes_promotion() -> TestResult {
        let record = record("free_items");
        let promotion = Promotion::try_from(&record)?;

        assert_eq!(
            promotion.kind(),
            PromotionKind::FreeItems { free_quantity: 1 }
        );
        assert_eq!(promotion.min_quantity(), 3);
        assert_eq!(
            promotion.scope(),
            PromotionScope::Category(CategoryUuid::from_uuid(record.target.ok_or("target")?))
        );

        Ok(())
    }

    #[test]
    fn percentage_row_becomes_promotion() -> TestResult {
        let mut record = record("percentage_off");
        record.applies_to = "all".to_string();
        record.target = None;

        let promotion = Promotion::try_from(&record)?;

        assert_eq!(
            promotion.kind(),
            PromotionKind::PercentageOff { percentage: 10 }
        );
        assert_eq!(promotion.scope(), PromotionScope::All);

        Ok(())
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            Promotion::try_from(&record("bogo")),
            Err(InvalidPromotion::UnknownKind("bogo".to_string()))
        );
    }

    #[test]
    fn free_items_row_with_percentage_is_rejected() {
        let mut record = record("free_items");
        record.percentage = Some(50);

        assert_eq!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::ConflictingPayload("percentage"))
        );
    }

    #[test]
    fn percentage_row_with_free_quantity_is_rejected() {
        let mut record = record("percentage_off");
        record.free_quantity = Some(1);

        assert_eq!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::ConflictingPayload("free_quantity"))
        );
    }

    #[test]
    fn scoped_row_without_target_is_rejected() {
        let mut record = record("free_items");
        record.target = None;

        assert_eq!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::Missing("target_uuid"))
        );
    }

    #[test]
    fn negative_quantities_are_out_of_range() {
        let mut record = record("free_items");
        record.min_quantity = -1;

        assert_eq!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::OutOfRange("min_quantity"))
        );
    }

    #[test]
    fn zero_threshold_fails_promotion_checks() {
        let mut record = record("free_items");
        record.min_quantity = 0;

        assert!(matches!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::Promotion(
                PromotionError::InvalidMinQuantity(_)
            ))
        ));
    }

    #[test]
    fn oversized_percentage_fails_promotion_checks() {
        let mut record = record("percentage_off");
        record.percentage = Some(150);

        assert!(matches!(
            Promotion::try_from(&record),
            Err(InvalidPromotion::Promotion(
                PromotionError::InvalidPercentage { percentage: 150, .. }
            ))
        ));
    }

    #[test]
    fn scope_targets_round_trip_through_rows() {
        let category = CategoryUuid::new();

        assert_eq!(scope_target(PromotionScope::All), None);
        assert_eq!(
            scope_target(PromotionScope::Category(category)),
            Some(category.into_uuid())
        );
    }
}
