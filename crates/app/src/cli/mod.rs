use clap::{Args, Parser, Subcommand};
use rusty_money::Money;
use storefront::currency;
use storefront_app::{
    auth::{Session, UserUuid},
    config::{DatabaseConfig, LoggingConfig, StoreConfig},
    context::AppContext,
    observability,
};

mod cart;
mod checkout;
mod db;
mod orders;
mod price;
mod products;
mod promotions;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Cart(cart::CartCommand),
    Checkout(checkout::CheckoutArgs),
    Orders(orders::OrdersCommand),
    Promotions(promotions::PromotionsCommand),
    Products(products::ProductsCommand),
    Price(price::PriceArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Cart(command) => cart::run(command, &self.store).await,
            Commands::Checkout(args) => checkout::run(args, &self.store).await,
            Commands::Orders(command) => orders::run(command, &self.store).await,
            Commands::Promotions(command) => promotions::run(command, &self.store).await,
            Commands::Products(command) => products::run(command, &self.store).await,
            Commands::Price(args) => price::run(args, &self.store),
        }
    }
}

/// Who the command runs as.
#[derive(Debug, Args)]
pub(crate) struct SessionArgs {
    /// Signed-in user
    #[arg(long, env = "STOREFRONT_USER")]
    user: Option<UserUuid>,

    /// Act with administrator rights
    #[arg(long, env = "STOREFRONT_ADMIN")]
    admin: bool,
}

impl SessionArgs {
    pub(crate) fn session(&self) -> Session {
        match (self.user, self.admin) {
            (None, _) => Session::Anonymous,
            (Some(user), false) => Session::customer(user),
            (Some(user), true) => Session::admin(user),
        }
    }
}

pub(crate) async fn connect(
    database: &DatabaseConfig,
    store: &StoreConfig,
) -> Result<AppContext, String> {
    AppContext::connect(database, store)
        .await
        .map_err(|error| format!("failed to start: {error}"))
}

/// Render a stored minor-unit amount in the currency it was recorded in.
pub(crate) fn format_amount(amount: u64, code: &str) -> String {
    match (currency::lookup(code), i64::try_from(amount)) {
        (Some(currency), Ok(minor)) => Money::from_minor(minor, currency).to_string(),
        _ => format!("{amount} {code}"),
    }
}
