//! Promotion Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::default_active},
    promotions::{PromotionKind, ValidityWindow},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Map of promotion key -> promotion fixture
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionFixture {
    /// Buy N, get M free
    FreeItems {
        /// Free units per eligible set
        free_quantity: u32,

        /// Shared rule fields
        #[serde(flatten)]
        rule: RuleFixture,
    },

    /// Buy N, get a percentage off the bundle
    PercentageOff {
        /// Whole percentage points
        percentage: u16,

        /// Shared rule fields
        #[serde(flatten)]
        rule: RuleFixture,
    },
}

impl PromotionFixture {
    /// Fields shared by every promotion type
    pub fn rule(&self) -> &RuleFixture {
        match self {
            Self::FreeItems { rule, .. } | Self::PercentageOff { rule, .. } => rule,
        }
    }

    /// Promotion kind
    ///
    /// # Errors
    ///
    /// Returns an error if the percentage doesn't fit in whole percentage points.
    pub fn kind(&self) -> Result<PromotionKind, FixtureError> {
        match *self {
            Self::FreeItems { free_quantity, .. } => Ok(PromotionKind::FreeItems { free_quantity }),
            Self::PercentageOff { percentage, .. } => u8::try_from(percentage)
                .map(|percentage| PromotionKind::PercentageOff { percentage })
                .map_err(|_err| {
                    FixtureError::InvalidPromotionData(format!(
                        "percentage {percentage} is out of range"
                    ))
                }),
        }
    }
}

/// Fields common to all promotion fixtures
#[derive(Debug, Deserialize)]
pub struct RuleFixture {
    /// Display name
    pub name: String,

    /// In-scope units needed for the promotion to fire
    pub min_quantity: u32,

    /// Targeting rule
    #[serde(default)]
    pub applies_to: ScopeFixture,

    /// Category, brand or product key the rule targets
    #[serde(default)]
    pub target: Option<String>,

    /// Whether the promotion is switched on
    #[serde(default = "default_active")]
    pub active: bool,

    /// Start of the validity window
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the validity window
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
}

impl RuleFixture {
    /// Validity window
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow {
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}

/// Targeting rule kinds in YAML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFixture {
    /// Every product
    #[default]
    All,

    /// A category key
    Category,

    /// A brand key
    Brand,

    /// A product key
    Product,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn free_items_fixture_parses() -> TestResult {
        let fixture: PromotionFixture = serde_norway::from_str(
            "type: free_items\nname: Tea bundle\nmin_quantity: 3\nfree_quantity: 1\napplies_to: category\ntarget: tea\n",
        )?;

        assert_eq!(
            fixture.kind()?,
            PromotionKind::FreeItems { free_quantity: 1 }
        );
        assert_eq!(fixture.rule().applies_to, ScopeFixture::Category);
        assert_eq!(fixture.rule().target.as_deref(), Some("tea"));
        assert!(fixture.rule().active);

        Ok(())
    }

    #[test]
    fn percentage_fixture_defaults_to_all_products() -> TestResult {
        let fixture: PromotionFixture = serde_norway::from_str(
            "type: percentage_off\nname: Ten off\nmin_quantity: 2\npercentage: 10\nends_at: 2030-01-01T00:00:00Z\n",
        )?;

        assert_eq!(
            fixture.kind()?,
            PromotionKind::PercentageOff { percentage: 10 }
        );
        assert_eq!(fixture.rule().applies_to, ScopeFixture::All);
        assert_eq!(
            fixture.rule().window().ends_at,
            Some("2030-01-01T00:00:00Z".parse()?)
        );

        Ok(())
    }

    #[test]
    fn oversized_percentage_is_rejected() -> TestResult {
        let fixture: PromotionFixture = serde_norway::from_str(
            "type: percentage_off\nname: Broken\nmin_quantity: 1\npercentage: 300\n",
        )?;

        assert!(matches!(
            fixture.kind(),
            Err(FixtureError::InvalidPromotionData(_))
        ));

        Ok(())
    }
}
