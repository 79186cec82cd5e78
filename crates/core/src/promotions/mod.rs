//! Promotions
//!
//! A promotion is a quantity-threshold rule scoped to all products, a category, a brand or a
//! single product. Once the in-scope quantity reaches the threshold it either gives away free
//! units or takes a percentage off the whole in-scope total.

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    ids::{BrandUuid, CategoryUuid, TypedUuid},
    products::{ProductSnapshot, ProductUuid},
};

pub mod effects;
pub mod eligibility;

/// Promotion UUID
pub type PromotionUuid = TypedUuid<Promotion>;

/// Promotion configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionError {
    /// Minimum quantity must be at least one.
    #[error("promotion {0}: minimum quantity must be at least 1")]
    InvalidMinQuantity(PromotionUuid),

    /// Free quantity must be at least one.
    #[error("promotion {0}: free quantity must be at least 1")]
    InvalidFreeQuantity(PromotionUuid),

    /// Percentage must be within 1..=100.
    #[error("promotion {uuid}: discount percentage {percentage} is outside 1..=100")]
    InvalidPercentage {
        /// Promotion identifier
        uuid: PromotionUuid,
        /// Rejected percentage
        percentage: u16,
    },

    /// Window ends before it starts.
    #[error("promotion {0}: end date precedes start date")]
    InvalidWindow(PromotionUuid),
}

/// What a promotion grants once it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionKind {
    /// Buy `min_quantity`, get `free_quantity` units free, per complete set.
    FreeItems {
        /// Free units granted per eligible set
        free_quantity: u32,
    },

    /// Buy `min_quantity`, get `percentage` off the whole in-scope total.
    PercentageOff {
        /// Whole percentage points, 1..=100
        percentage: u8,
    },
}

impl PromotionKind {
    /// Stable identifier used for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FreeItems { .. } => "free_items",
            Self::PercentageOff { .. } => "percentage_off",
        }
    }
}

/// Which products a promotion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionScope {
    /// Every product
    All,

    /// Products in a category
    Category(CategoryUuid),

    /// Products of a brand
    Brand(BrandUuid),

    /// A single product
    Product(ProductUuid),
}

impl PromotionScope {
    /// Whether the product falls under this scope. Activity is checked separately.
    pub fn covers(&self, product: &ProductSnapshot<'_>) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => product.category == *category,
            Self::Brand(brand) => product.brand == *brand,
            Self::Product(uuid) => product.uuid == *uuid,
        }
    }

    /// Stable identifier used for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Category(_) => "category",
            Self::Brand(_) => "brand",
            Self::Product(_) => "product",
        }
    }
}

/// Inclusive validity window; missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityWindow {
    /// First instant the promotion is valid
    pub starts_at: Option<Timestamp>,

    /// Last instant the promotion is valid
    pub ends_at: Option<Timestamp>,
}

impl ValidityWindow {
    /// A window with no bounds
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            starts_at: None,
            ends_at: None,
        }
    }

    /// Whether `now` falls inside the window.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.starts_at.is_none_or(|start| start <= now) && self.ends_at.is_none_or(|end| now <= end)
    }
}

/// A validated promotion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    uuid: PromotionUuid,
    name: String,
    kind: PromotionKind,
    min_quantity: u32,
    scope: PromotionScope,
    active: bool,
    window: ValidityWindow,
}

impl Promotion {
    /// Create a new promotion, checking its configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] when the minimum or free quantity is zero, the percentage is
    /// outside `1..=100`, or the window ends before it starts.
    pub fn new(
        uuid: PromotionUuid,
        name: impl Into<String>,
        kind: PromotionKind,
        min_quantity: u32,
        scope: PromotionScope,
        active: bool,
        window: ValidityWindow,
    ) -> Result<Self, PromotionError> {
        if min_quantity == 0 {
            return Err(PromotionError::InvalidMinQuantity(uuid));
        }

        match kind {
            PromotionKind::FreeItems { free_quantity: 0 } => {
                return Err(PromotionError::InvalidFreeQuantity(uuid));
            }
            PromotionKind::PercentageOff { percentage } if !(1..=100).contains(&percentage) => {
                return Err(PromotionError::InvalidPercentage {
                    uuid,
                    percentage: u16::from(percentage),
                });
            }
            PromotionKind::FreeItems { .. } | PromotionKind::PercentageOff { .. } => {}
        }

        if let (Some(start), Some(end)) = (window.starts_at, window.ends_at)
            && end < start
        {
            return Err(PromotionError::InvalidWindow(uuid));
        }

        Ok(Self {
            uuid,
            name: name.into(),
            kind,
            min_quantity,
            scope,
            active,
            window,
        })
    }

    /// Promotion identifier
    pub fn uuid(&self) -> PromotionUuid {
        self.uuid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the promotion grants
    pub fn kind(&self) -> PromotionKind {
        self.kind
    }

    /// In-scope quantity needed to fire
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Targeted products
    pub fn scope(&self) -> PromotionScope {
        self.scope
    }

    /// Administrative on/off switch
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Validity window
    pub fn window(&self) -> ValidityWindow {
        self.window
    }

    /// Active and inside its validity window at `now`.
    pub fn is_effective(&self, now: Timestamp) -> bool {
        self.active && self.window.contains(now)
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn free_items(min_quantity: u32, free_quantity: u32) -> Result<Promotion, PromotionError> {
        Promotion::new(
            PromotionUuid::new(),
            "Buy some, get some",
            PromotionKind::FreeItems { free_quantity },
            min_quantity,
            PromotionScope::All,
            true,
            ValidityWindow::unbounded(),
        )
    }

    #[test]
    fn rejects_zero_min_quantity() {
        assert!(matches!(
            free_items(0, 1),
            Err(PromotionError::InvalidMinQuantity(_))
        ));
    }

    #[test]
    fn rejects_zero_free_quantity() {
        assert!(matches!(
            free_items(2, 0),
            Err(PromotionError::InvalidFreeQuantity(_))
        ));
    }

    #[test]
    fn rejects_percentage_outside_range() {
        for percentage in [0, 101] {
            let result = Promotion::new(
                PromotionUuid::new(),
                "Bad",
                PromotionKind::PercentageOff { percentage },
                1,
                PromotionScope::All,
                true,
                ValidityWindow::unbounded(),
            );

            assert!(
                matches!(result, Err(PromotionError::InvalidPercentage { .. })),
                "{percentage}% should be rejected"
            );
        }
    }

    #[test]
    fn rejects_inverted_window() -> TestResult {
        let now = Timestamp::now();
        let window = ValidityWindow {
            starts_at: Some(now),
            ends_at: Some(now.checked_sub(1.hour())?),
        };

        let result = Promotion::new(
            PromotionUuid::new(),
            "Backwards",
            PromotionKind::FreeItems { free_quantity: 1 },
            1,
            PromotionScope::All,
            true,
            window,
        );

        assert!(matches!(result, Err(PromotionError::InvalidWindow(_))));

        Ok(())
    }

    #[test]
    fn window_bounds_are_inclusive() -> TestResult {
        let now = Timestamp::now();
        let window = ValidityWindow {
            starts_at: Some(now),
            ends_at: Some(now.checked_add(1.hour())?),
        };

        assert!(window.contains(now));
        assert!(window.contains(now.checked_add(1.hour())?));
        assert!(!window.contains(now.checked_sub(1.second())?));
        assert!(!window.contains(now.checked_add(61.minutes())?));

        Ok(())
    }

    #[test]
    fn open_window_is_unbounded() -> TestResult {
        let now = Timestamp::now();
        let window = ValidityWindow {
            starts_at: None,
            ends_at: Some(now),
        };

        assert!(ValidityWindow::unbounded().contains(now));
        assert!(window.contains(now.checked_sub(10_000.hours())?));

        Ok(())
    }

    #[test]
    fn inactive_promotion_is_never_effective() -> TestResult {
        let promotion = Promotion::new(
            PromotionUuid::new(),
            "Switched off",
            PromotionKind::PercentageOff { percentage: 10 },
            1,
            PromotionScope::All,
            false,
            ValidityWindow::unbounded(),
        )?;

        assert!(!promotion.is_effective(Timestamp::now()));

        Ok(())
    }
}
