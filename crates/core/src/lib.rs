//! Storefront
//!
//! Cart pricing engine for the storefront: promotion eligibility, free-item and percentage
//! discounts, cart totals and checkout-time settlement planning.

pub mod currency;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod settlement;
