//! Database maintenance commands.

use clap::{Args, Subcommand};

use pharmacy_app::database;

#[derive(Debug, Args)]
pub(crate) struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending migrations.
    Migrate,
}

pub(crate) async fn run(command: DbCommand, database_url: &str) -> Result<(), String> {
    match command.command {
        DbSubcommand::Migrate => migrate(database_url).await,
    }
}

async fn migrate(database_url: &str) -> Result<(), String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}
