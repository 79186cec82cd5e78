//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart items in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in display order
    pub items: Vec<CartItemFixture>,
}

/// One cart line
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Product key
    pub product: String,

    /// Units in the cart
    pub quantity: u32,
}
