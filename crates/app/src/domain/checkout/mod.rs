//! Checkout

mod errors;
pub mod service;
pub mod shipping;

pub use errors::CheckoutError;
pub use service::*;
pub use shipping::{MissingShippingField, ShippingDetails, ShippingPolicy};
