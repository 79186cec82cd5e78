use clap::{Args, Subcommand};
use storefront_app::{
    config::{DatabaseConfig, StoreConfig},
    domain::orders::records::{OrderStatus, OrderUuid},
};

use crate::cli::{SessionArgs, connect, format_amount};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List your orders
    List,

    /// Show an order as JSON
    Show(OrderArgs),

    /// Move an order to a new status (admin)
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderUuid,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderUuid,

    /// pending, packed, shipped, delivered or cancelled
    #[arg(long)]
    status: OrderStatus,
}

pub(crate) async fn run(command: OrdersCommand, store: &StoreConfig) -> Result<(), String> {
    let session = command.session.session();
    let context = connect(&command.database, store).await?;

    match command.command {
        OrdersSubcommand::List => {
            let user = session.require_user().map_err(|error| error.to_string())?;

            let orders = context
                .orders
                .list_orders(user)
                .await
                .map_err(|error| format!("failed to list orders: {error}"))?;

            if orders.is_empty() {
                println!("no orders");
            }

            for order in orders {
                println!(
                    "{}  {:<9}  {}  {}",
                    order.uuid,
                    order.status,
                    order.created_at,
                    format_amount(order.amount_due, &order.currency)
                );
            }
        }
        OrdersSubcommand::Show(args) => {
            let user = session.require_user().map_err(|error| error.to_string())?;

            // Admins may look at any order.
            let owner = session.require_admin().map_or(Some(user), |_admin| None);

            let order = context
                .orders
                .get_order(owner, args.order)
                .await
                .map_err(|error| format!("failed to fetch order: {error}"))?;

            let json = serde_json::to_string_pretty(&order)
                .map_err(|error| format!("failed to serialise order: {error}"))?;

            println!("{json}");
        }
        OrdersSubcommand::Status(args) => {
            session.require_admin().map_err(|error| error.to_string())?;

            let order = context
                .orders
                .update_status(args.order, args.status)
                .await
                .map_err(|error| format!("failed to update order: {error}"))?;

            println!("order_uuid: {}", order.uuid);
            println!("status: {}", order.status);
        }
    }

    Ok(())
}
