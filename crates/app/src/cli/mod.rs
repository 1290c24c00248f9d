use clap::{Parser, Subcommand};

mod db;
mod medicine;
mod report;

#[derive(Debug, Parser)]
#[command(name = "pharmacy-app", about = "Pharmacy inventory CLI", long_about = None)]
pub(crate) struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Medicine(medicine::MedicineCommand),
    Report(report::ReportCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let database_url = self
            .database_url
            .ok_or_else(|| "DATABASE_URL is not set".to_string())?;

        match self.command {
            Commands::Medicine(command) => medicine::run(command, &database_url).await,
            Commands::Report(command) => report::run(command, &database_url).await,
            Commands::Db(command) => db::run(command, &database_url).await,
        }
    }
}
