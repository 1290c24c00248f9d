//! Medicine record commands.

use clap::{Args, Subcommand};
use jiff::civil::Date;
use rust_decimal::Decimal;

use pharmacy_app::{
    context::AppContext,
    domain::medicines::{
        data::NewMedicine,
        models::{Medicine, MedicineId},
    },
};

#[derive(Debug, Args)]
pub(crate) struct MedicineCommand {
    #[command(subcommand)]
    command: MedicineSubcommand,
}

#[derive(Debug, Subcommand)]
enum MedicineSubcommand {
    /// Add a medicine to the inventory.
    Add(AddArgs),
    /// List all medicines.
    List(ListArgs),
    /// Show a single medicine.
    Show(IdArgs),
    /// Delete a medicine.
    Delete(IdArgs),
    /// Process a sale, enforcing the expiry and stock guards.
    Sell(SellArgs),
    /// Adjust stock by a signed delta; a negative result clamps to zero.
    Stock(StockArgs),
    /// Delete every medicine whose expiry date has passed.
    PurgeExpired,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    manufacturer: String,

    #[arg(long)]
    price: Decimal,

    #[arg(long)]
    stock: i32,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expires: Date,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    batch_number: Option<String>,

    /// Mark the medicine as prescription-only.
    #[arg(long)]
    prescription: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Emit the full records as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct IdArgs {
    #[arg(long)]
    id: MedicineId,
}

#[derive(Debug, Args)]
struct SellArgs {
    #[arg(long)]
    id: MedicineId,

    #[arg(long)]
    quantity: i32,
}

#[derive(Debug, Args)]
struct StockArgs {
    #[arg(long)]
    id: MedicineId,

    #[arg(long, allow_hyphen_values = true)]
    delta: i32,
}

pub(crate) async fn run(command: MedicineCommand, database_url: &str) -> Result<(), String> {
    let ctx = AppContext::from_database_url(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match command.command {
        MedicineSubcommand::Add(args) => add(&ctx, args).await,
        MedicineSubcommand::List(args) => list(&ctx, args).await,
        MedicineSubcommand::Show(args) => show(&ctx, args).await,
        MedicineSubcommand::Delete(args) => delete(&ctx, args).await,
        MedicineSubcommand::Sell(args) => sell(&ctx, args).await,
        MedicineSubcommand::Stock(args) => stock(&ctx, args).await,
        MedicineSubcommand::PurgeExpired => purge_expired(&ctx).await,
    }
}

async fn add(ctx: &AppContext, args: AddArgs) -> Result<(), String> {
    let medicine = ctx
        .medicines
        .create_medicine(NewMedicine {
            name: args.name,
            description: args.description,
            manufacturer: args.manufacturer,
            price: args.price,
            stock_quantity: args.stock,
            expiry_date: args.expires,
            category: args.category,
            prescription_required: args.prescription,
            batch_number: args.batch_number,
        })
        .await
        .map_err(|error| format!("failed to add medicine: {error}"))?;

    println!("added medicine {} (id {})", medicine.name, medicine.id);

    Ok(())
}

async fn list(ctx: &AppContext, args: ListArgs) -> Result<(), String> {
    let medicines = ctx
        .medicines
        .list_medicines()
        .await
        .map_err(|error| format!("failed to list medicines: {error}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&medicines)
            .map_err(|error| format!("failed to serialize medicines: {error}"))?;
        println!("{json}");
    } else {
        for medicine in &medicines {
            print_row(medicine);
        }
    }

    Ok(())
}

async fn show(ctx: &AppContext, args: IdArgs) -> Result<(), String> {
    let medicine = ctx
        .medicines
        .get_medicine(args.id)
        .await
        .map_err(|error| format!("failed to fetch medicine: {error}"))?;

    println!("id: {}", medicine.id);
    println!("name: {}", medicine.name);
    println!("manufacturer: {}", medicine.manufacturer);
    println!("price: {}", medicine.price);
    println!("stock: {}", medicine.stock_quantity);
    println!("expires: {}", medicine.expiry_date);

    if let Some(description) = &medicine.description {
        println!("description: {description}");
    }
    if let Some(category) = &medicine.category {
        println!("category: {category}");
    }
    if let Some(batch_number) = &medicine.batch_number {
        println!("batch: {batch_number}");
    }

    println!("prescription required: {}", medicine.prescription_required);

    Ok(())
}

async fn delete(ctx: &AppContext, args: IdArgs) -> Result<(), String> {
    ctx.medicines
        .delete_medicine(args.id)
        .await
        .map_err(|error| format!("failed to delete medicine: {error}"))?;

    println!("deleted medicine {}", args.id);

    Ok(())
}

async fn sell(ctx: &AppContext, args: SellArgs) -> Result<(), String> {
    let medicine = ctx
        .medicines
        .process_sale(args.id, args.quantity)
        .await
        .map_err(|error| format!("sale failed: {error}"))?;

    println!(
        "sold {} x {}; {} left in stock",
        args.quantity, medicine.name, medicine.stock_quantity
    );

    Ok(())
}

async fn stock(ctx: &AppContext, args: StockArgs) -> Result<(), String> {
    let medicine = ctx
        .medicines
        .adjust_stock(args.id, args.delta)
        .await
        .map_err(|error| format!("failed to adjust stock: {error}"))?;

    println!("{}: stock is now {}", medicine.name, medicine.stock_quantity);

    Ok(())
}

async fn purge_expired(ctx: &AppContext) -> Result<(), String> {
    let purged = ctx
        .medicines
        .purge_expired()
        .await
        .map_err(|error| format!("failed to purge expired medicines: {error}"))?;

    println!("purged {purged} expired medicines");

    Ok(())
}

fn print_row(medicine: &Medicine) {
    println!(
        "{:>6}  {:<40} {:>10} {:>7}  {}",
        medicine.id,
        medicine.name,
        medicine.price,
        medicine.stock_quantity,
        medicine.expiry_date
    );
}
