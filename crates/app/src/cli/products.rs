use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront::{
    currency,
    ids::{BrandUuid, CategoryUuid},
    products::{ProductSnapshot, ProductUuid},
};
use storefront_app::{
    config::{DatabaseConfig, StoreConfig},
    domain::catalog::records::NewProduct,
};

use crate::cli::{SessionArgs, connect};

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// List the catalog
    List,

    /// Add a product (admin)
    Create(CreateArgs),

    /// Set units on hand (admin)
    Stock(StockArgs),
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Unit price in major units of the store currency
    #[arg(long)]
    price: Decimal,

    /// Units on hand
    #[arg(long, default_value_t = 0)]
    stock: u32,

    /// Category UUID
    #[arg(long)]
    category: CategoryUuid,

    /// Brand UUID
    #[arg(long)]
    brand: BrandUuid,

    /// Create the product hidden from sale
    #[arg(long)]
    inactive: bool,
}

#[derive(Debug, Args)]
struct StockArgs {
    /// Product UUID
    #[arg(long)]
    product: ProductUuid,

    /// Units on hand
    #[arg(long)]
    stock: u32,
}

fn print_product(product: &ProductSnapshot<'_>) {
    println!(
        "{}  {:<8}  {}  {}  stock {}",
        product.uuid,
        if product.active { "active" } else { "inactive" },
        product.name,
        product.price,
        product.stock,
    );
}

pub(crate) async fn run(command: ProductsCommand, store: &StoreConfig) -> Result<(), String> {
    let session = command.session.session();
    let context = connect(&command.database, store).await?;

    match command.command {
        ProductsSubcommand::List => {
            let products = context
                .catalog
                .list_products()
                .await
                .map_err(|error| format!("failed to list products: {error}"))?;

            products.iter().for_each(print_product);
        }
        ProductsSubcommand::Create(args) => {
            session.require_admin().map_err(|error| error.to_string())?;

            let store_currency = store.currency().map_err(|error| error.to_string())?;
            let price = currency::to_minor_units(args.price, store_currency)
                .and_then(|minor| u64::try_from(minor).ok())
                .ok_or_else(|| format!("invalid price: {}", args.price))?;

            let product = context
                .catalog
                .create_product(NewProduct {
                    uuid: ProductUuid::new(),
                    name: args.name,
                    price,
                    stock: args.stock,
                    active: !args.inactive,
                    category: args.category,
                    brand: args.brand,
                })
                .await
                .map_err(|error| format!("failed to create product: {error}"))?;

            print_product(&product);
        }
        ProductsSubcommand::Stock(args) => {
            session.require_admin().map_err(|error| error.to_string())?;

            let product = context
                .catalog
                .update_stock(args.product, args.stock)
                .await
                .map_err(|error| format!("failed to update stock: {error}"))?;

            print_product(&product);
        }
    }

    Ok(())
}
