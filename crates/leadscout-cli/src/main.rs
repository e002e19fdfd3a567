mod lists;
mod search;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "leadscout-cli")]
#[command(about = "Lead discovery and enrichment from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for businesses, optionally enrich and save the results
    Search(search::SearchArgs),
    /// Inspect, export, and delete saved lead lists
    Lists(lists::ListsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = leadscout_core::load_app_config()?;
    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => search::run(&config, args).await,
        Commands::Lists(args) => lists::run(&config, args).await,
    }
}
