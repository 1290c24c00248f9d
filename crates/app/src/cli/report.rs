//! Inventory reports.

use clap::{Args, Subcommand};

use pharmacy_app::{
    context::AppContext,
    domain::medicines::{DEFAULT_LOW_STOCK_THRESHOLD, models::Medicine},
};

#[derive(Debug, Args)]
pub(crate) struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReportSubcommand {
    /// Medicines with stock strictly below the threshold.
    LowStock(LowStockArgs),
    /// Medicines whose expiry date has passed.
    Expired(JsonArgs),
    /// Medicines expiring within the next N days, today included.
    Expiring(ExpiringArgs),
    /// Inventory totals: counts and overall value.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
struct LowStockArgs {
    #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    threshold: i32,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct JsonArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ExpiringArgs {
    #[arg(long, default_value_t = 30)]
    days: i32,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    threshold: i32,
}

pub(crate) async fn run(command: ReportCommand, database_url: &str) -> Result<(), String> {
    let ctx = AppContext::from_database_url(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match command.command {
        ReportSubcommand::LowStock(args) => low_stock(&ctx, args).await,
        ReportSubcommand::Expired(args) => expired(&ctx, args).await,
        ReportSubcommand::Expiring(args) => expiring(&ctx, args).await,
        ReportSubcommand::Summary(args) => summary(&ctx, args).await,
    }
}

async fn low_stock(ctx: &AppContext, args: LowStockArgs) -> Result<(), String> {
    let medicines = ctx
        .medicines
        .low_stock_medicines(args.threshold)
        .await
        .map_err(|error| format!("failed to run low-stock report: {error}"))?;

    print_medicines(&medicines, args.json)
}

async fn expired(ctx: &AppContext, args: JsonArgs) -> Result<(), String> {
    let medicines = ctx
        .medicines
        .expired_medicines()
        .await
        .map_err(|error| format!("failed to run expired report: {error}"))?;

    print_medicines(&medicines, args.json)
}

async fn expiring(ctx: &AppContext, args: ExpiringArgs) -> Result<(), String> {
    let medicines = ctx
        .medicines
        .medicines_expiring_within(args.days)
        .await
        .map_err(|error| format!("failed to run expiring report: {error}"))?;

    print_medicines(&medicines, args.json)
}

async fn summary(ctx: &AppContext, args: SummaryArgs) -> Result<(), String> {
    let summary = ctx
        .medicines
        .inventory_summary(args.threshold)
        .await
        .map_err(|error| format!("failed to run summary report: {error}"))?;

    println!("medicines: {}", summary.total_medicines);
    println!("expired: {}", summary.expired);
    println!("low stock: {}", summary.low_stock);
    println!("total value: {}", summary.total_value);

    Ok(())
}

fn print_medicines(medicines: &[Medicine], json: bool) -> Result<(), String> {
    if json {
        let json = serde_json::to_string_pretty(medicines)
            .map_err(|error| format!("failed to serialize medicines: {error}"))?;
        println!("{json}");
    } else {
        for medicine in medicines {
            println!(
                "{:>6}  {:<40} {:>7}  {}",
                medicine.id, medicine.name, medicine.stock_quantity, medicine.expiry_date
            );
        }
    }

    Ok(())
}
