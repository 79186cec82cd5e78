//! Postgres-backed test support.

mod context;
mod db;

pub(crate) use context::{CURRENCY, TestContext};
