use std::{io, path::PathBuf};

use clap::Args;
use jiff::Timestamp;
use storefront::{fixtures::Fixture, receipt::Receipt};
use storefront_app::config::StoreConfig;

/// Price a YAML fixture set without a database.
#[derive(Debug, Args)]
pub(crate) struct PriceArgs {
    /// Fixture set name, e.g. `tea_shop`
    #[arg(long)]
    set: String,

    /// Directory holding `products/`, `promotions/` and `carts/`
    #[arg(long, default_value = "crates/core/fixtures")]
    fixtures: PathBuf,

    /// Price as of this instant instead of now
    #[arg(long)]
    at: Option<Timestamp>,

    /// Leave shipping off the receipt
    #[arg(long)]
    no_shipping: bool,
}

pub(crate) fn run(args: PriceArgs, store: &StoreConfig) -> Result<(), String> {
    let mut fixture = Fixture::with_base_path(&args.fixtures);

    fixture
        .load_products(&args.set)
        .and_then(|fixture| fixture.load_promotions(&args.set))
        .and_then(|fixture| fixture.load_cart(&args.set))
        .map_err(|error| format!("failed to load fixture set {}: {error}", args.set))?;

    let priced = fixture
        .price(args.at.unwrap_or_else(Timestamp::now))
        .map_err(|error| format!("failed to price cart: {error}"))?;

    let mut receipt = Receipt::new(&priced);

    if !args.no_shipping && !priced.is_empty() {
        let policy = store
            .shipping_policy_in(priced.currency())
            .map_err(|error| error.to_string())?;

        receipt = receipt.with_shipping(policy.fee_for(priced.final_total()));
    }

    receipt
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to print receipt: {error}"))
}
