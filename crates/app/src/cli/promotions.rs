use clap::{Args, Subcommand, ValueEnum};
use jiff::Timestamp;
use storefront::{
    ids::{BrandUuid, CategoryUuid},
    products::ProductUuid,
    promotions::{Promotion, PromotionKind, PromotionScope, PromotionUuid, ValidityWindow},
};
use storefront_app::{
    config::{DatabaseConfig, StoreConfig},
    domain::promotions::records::PromotionRecord,
};
use uuid::Uuid;

use crate::cli::{SessionArgs, connect};

#[derive(Debug, Args)]
pub(crate) struct PromotionsCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: PromotionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromotionsSubcommand {
    /// List every promotion
    List,

    /// Create a promotion
    Create(CreateArgs),

    /// Switch a promotion on or off
    Toggle(ToggleArgs),

    /// Delete a promotion
    Delete(PromotionArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scope {
    All,
    Category,
    Brand,
    Product,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// In-scope units needed before the promotion fires
    #[arg(long)]
    min_quantity: u32,

    /// Free units per complete set
    #[arg(long, conflicts_with = "percentage", required_unless_present = "percentage")]
    free_quantity: Option<u32>,

    /// Whole percentage off the in-scope total
    #[arg(long)]
    percentage: Option<u8>,

    /// Which products the promotion covers
    #[arg(long, value_enum, default_value_t = Scope::All)]
    applies_to: Scope,

    /// Category, brand or product UUID for scoped promotions
    #[arg(long)]
    target: Option<Uuid>,

    /// First instant the promotion is valid
    #[arg(long)]
    starts_at: Option<Timestamp>,

    /// Last instant the promotion is valid
    #[arg(long)]
    ends_at: Option<Timestamp>,

    /// Create the promotion switched off
    #[arg(long)]
    inactive: bool,
}

#[derive(Debug, Args)]
struct ToggleArgs {
    /// Promotion UUID
    #[arg(long)]
    promotion: PromotionUuid,

    /// Switch the promotion off instead of on
    #[arg(long)]
    off: bool,
}

#[derive(Debug, Args)]
struct PromotionArgs {
    /// Promotion UUID
    #[arg(long)]
    promotion: PromotionUuid,
}

const ONE_KIND_REQUIRED: &str = "pass exactly one of --free-quantity or --percentage";
const TARGET_REQUIRED: &str = "--target is required for scoped promotions";

impl CreateArgs {
    fn promotion(self) -> Result<Promotion, String> {
        let kind = match (self.free_quantity, self.percentage) {
            (Some(free_quantity), None) => PromotionKind::FreeItems { free_quantity },
            (None, Some(percentage)) => PromotionKind::PercentageOff { percentage },
            _ => return Err(ONE_KIND_REQUIRED.to_string()),
        };

        let target = || self.target.ok_or(TARGET_REQUIRED);

        let scope = match self.applies_to {
            Scope::All => PromotionScope::All,
            Scope::Category => PromotionScope::Category(CategoryUuid::from_uuid(target()?)),
            Scope::Brand => PromotionScope::Brand(BrandUuid::from_uuid(target()?)),
            Scope::Product => PromotionScope::Product(ProductUuid::from_uuid(target()?)),
        };

        Promotion::new(
            PromotionUuid::new(),
            self.name,
            kind,
            self.min_quantity,
            scope,
            !self.inactive,
            ValidityWindow {
                starts_at: self.starts_at,
                ends_at: self.ends_at,
            },
        )
        .map_err(|error| error.to_string())
    }
}

fn print_record(record: &PromotionRecord) {
    let effect = match (record.free_quantity, record.percentage) {
        (Some(free), _) if record.kind == "free_items" => format!("{free} free"),
        (_, Some(percentage)) if record.kind == "percentage_off" => format!("{percentage}% off"),
        _ => record.kind.clone(),
    };

    let scope = record.target.map_or_else(
        || record.applies_to.clone(),
        |target| format!("{} {target}", record.applies_to),
    );

    println!(
        "{}  {:<8}  {}  (buy {}, {effect}; {scope})",
        record.uuid,
        if record.active { "active" } else { "inactive" },
        record.name,
        record.min_quantity,
    );
}

pub(crate) async fn run(command: PromotionsCommand, store: &StoreConfig) -> Result<(), String> {
    command
        .session
        .session()
        .require_admin()
        .map_err(|error| error.to_string())?;

    let context = connect(&command.database, store).await?;

    match command.command {
        PromotionsSubcommand::List => {
            let promotions = context
                .promotions
                .list_promotions()
                .await
                .map_err(|error| format!("failed to list promotions: {error}"))?;

            if promotions.is_empty() {
                println!("no promotions");
            }

            promotions.iter().for_each(print_record);
        }
        PromotionsSubcommand::Create(args) => {
            let created = context
                .promotions
                .create_promotion(args.promotion()?)
                .await
                .map_err(|error| format!("failed to create promotion: {error}"))?;

            print_record(&created);
        }
        PromotionsSubcommand::Toggle(args) => {
            let updated = context
                .promotions
                .set_active(args.promotion, !args.off)
                .await
                .map_err(|error| format!("failed to toggle promotion: {error}"))?;

            print_record(&updated);
        }
        PromotionsSubcommand::Delete(args) => {
            context
                .promotions
                .delete_promotion(args.promotion)
                .await
                .map_err(|error| format!("failed to delete promotion: {error}"))?;

            println!("deleted {}", args.promotion);
        }
    }

    Ok(())
}
