use std::io;

use clap::{Args, Subcommand};
use storefront::{products::ProductUuid, receipt::Receipt};
use storefront_app::config::{DatabaseConfig, StoreConfig};

use crate::cli::{SessionArgs, connect};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart priced with current promotions
    Show,

    /// Add units of a product
    Add(AddArgs),

    /// Set the quantity of a product; zero removes it
    Update(ItemArgs),

    /// Remove a product from the cart
    Remove(ProductArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product UUID
    #[arg(long)]
    product: ProductUuid,

    /// Units, at least one
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: u32,
}

#[derive(Debug, Args)]
struct ItemArgs {
    /// Product UUID
    #[arg(long)]
    product: ProductUuid,

    /// Units
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product UUID
    #[arg(long)]
    product: ProductUuid,
}

pub(crate) async fn run(command: CartCommand, store: &StoreConfig) -> Result<(), String> {
    let session = command.session.session();
    let user = session.require_user().map_err(|error| error.to_string())?;
    let context = connect(&command.database, store).await?;

    match command.command {
        CartSubcommand::Show => {
            let preview = context
                .checkout
                .preview(session)
                .await
                .map_err(|error| format!("failed to price cart: {error}"))?;

            if preview.priced.is_empty() {
                println!("cart is empty");

                return Ok(());
            }

            Receipt::new(&preview.priced)
                .with_shipping(preview.shipping_fee)
                .write_to(io::stdout().lock())
                .map_err(|error| format!("failed to print cart: {error}"))?;
        }
        CartSubcommand::Add(args) => {
            let item = context
                .carts
                .add_item(user, args.product, args.quantity)
                .await
                .map_err(|error| format!("failed to add item: {error}"))?;

            println!("product_uuid: {}", item.product);
            println!("quantity: {}", item.quantity);
        }
        CartSubcommand::Update(args) => {
            let item = context
                .carts
                .update_quantity(user, args.product, args.quantity)
                .await
                .map_err(|error| format!("failed to update item: {error}"))?;

            match item {
                Some(item) => {
                    println!("product_uuid: {}", item.product);
                    println!("quantity: {}", item.quantity);
                }
                None => println!("removed {}", args.product),
            }
        }
        CartSubcommand::Remove(args) => {
            context
                .carts
                .remove_item(user, args.product)
                .await
                .map_err(|error| format!("failed to remove item: {error}"))?;

            println!("removed {}", args.product);
        }
        CartSubcommand::Clear => {
            context
                .carts
                .clear(user)
                .await
                .map_err(|error| format!("failed to clear cart: {error}"))?;

            println!("cart cleared");
        }
    }

    Ok(())
}
