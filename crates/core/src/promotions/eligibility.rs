//! Promotion eligibility
//!
//! Selects the cart lines a promotion covers and decides whether the promotion fires.

use smallvec::SmallVec;

use crate::{items::CartLine, promotions::Promotion};

/// Lines covered by a promotion and their combined quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    lines: SmallVec<[usize; 8]>,
    total_quantity: u64,
    min_quantity: u32,
}

impl Eligibility {
    /// Indexes (into the priced cart lines) of in-scope lines
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    /// Sum of quantities over in-scope lines
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Whether the in-scope quantity meets the promotion's minimum.
    pub fn fires(&self) -> bool {
        self.total_quantity > 0 && self.total_quantity >= u64::from(self.min_quantity)
    }
}

/// Resolve which lines `promotion` covers.
///
/// A line is in scope when its product resolves, is active and matches the promotion scope.
/// Targets that match nothing simply produce an empty result.
pub fn resolve(promotion: &Promotion, lines: &[CartLine<'_>]) -> Eligibility {
    let scope = promotion.scope();

    let (lines, total_quantity) = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            line.sellable_product()
                .is_some_and(|product| scope.covers(product))
        })
        .fold(
            (SmallVec::new(), 0_u64),
            |(mut idxs, qty): (SmallVec<[usize; 8]>, u64), (idx, line)| {
                idxs.push(idx);
                (idxs, qty + u64::from(line.quantity()))
            },
        );

    Eligibility {
        lines,
        total_quantity,
        min_quantity: promotion.min_quantity(),
    }
}
