//! Storefront application: stores, checkout, configuration and logging.

pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;
