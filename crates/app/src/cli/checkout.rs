use clap::Args;
use storefront_app::{
    config::{DatabaseConfig, StoreConfig},
    domain::checkout::ShippingDetails,
};

use crate::cli::{SessionArgs, connect, format_amount};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    /// Recipient name
    #[arg(long)]
    full_name: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Delivery address
    #[arg(long)]
    address: String,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,
}

pub(crate) async fn run(args: CheckoutArgs, store: &StoreConfig) -> Result<(), String> {
    let context = connect(&args.database, store).await?;

    let order = context
        .checkout
        .checkout(
            args.session.session(),
            ShippingDetails {
                full_name: args.full_name,
                phone: args.phone,
                address: args.address,
                notes: args.notes,
            },
        )
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    let record = &order.record;

    println!("order_uuid: {}", record.uuid);
    println!("status: {}", record.status);

    let amount = |minor| format_amount(minor, &record.currency);

    println!("subtotal: {}", amount(record.subtotal));
    println!("discounts: -{}", amount(record.total_discount));
    println!("shipping: {}", amount(record.shipping_fee));
    println!("amount_due: {}", amount(record.amount_due));

    Ok(())
}
