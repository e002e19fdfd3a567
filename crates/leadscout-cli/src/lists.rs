//! The `lists` command: manage saved lead lists.

use clap::{Args, Subcommand};
use uuid::Uuid;

use leadscout_core::AppConfig;
use leadscout_workflow::{LeadStore, PgLeadStore};

#[derive(Debug, Args)]
pub struct ListsArgs {
    #[command(subcommand)]
    command: ListsCommand,
}

#[derive(Debug, Subcommand)]
enum ListsCommand {
    /// Show all saved lists, newest first
    List,
    /// Print one list with its items
    Show { id: Uuid },
    /// Delete a list permanently
    Delete { id: Uuid },
    /// Write a list to a CSV file
    Export {
        id: Uuid,
        /// Output path; defaults to <list name>.csv in the working directory
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

pub async fn run(config: &AppConfig, args: ListsArgs) -> anyhow::Result<()> {
    let pool = leadscout_db::connect_pool(
        &config.database_url,
        leadscout_db::PoolConfig::from_app_config(config),
    )
    .await?;
    leadscout_db::run_migrations(&pool).await?;
    let store = PgLeadStore::new(pool);

    match args.command {
        ListsCommand::List => {
            let summaries = store.get_lists().await?;
            if summaries.is_empty() {
                println!("No saved lists.");
                return Ok(());
            }
            for summary in summaries {
                println!(
                    "{}  {:>4} item(s)  {}  {}",
                    summary.created_at.format("%Y-%m-%d %H:%M"),
                    summary.item_count,
                    summary.id,
                    summary.name
                );
            }
        }
        ListsCommand::Show { id } => {
            let list = store.get_list(id).await?;
            println!("{} ({} item(s), created {})", list.name, list.items.len(), list.created_at);
            for (index, item) in list.items.iter().enumerate() {
                println!("{:>3}. {} — {}", index + 1, item.name, item.address);
                if !item.emails.is_empty() {
                    println!("     email: {}", item.emails.join(", "));
                }
            }
        }
        ListsCommand::Delete { id } => {
            store.delete_list(id).await?;
            println!("Deleted list {id}.");
        }
        ListsCommand::Export { id, out } => {
            let list = store.get_list(id).await?;
            let blob = store.export_csv(id).await?;
            let path = out.unwrap_or_else(|| {
                std::path::PathBuf::from(format!("{}.csv", list.name.replace(' ', "_")))
            });
            tokio::fs::write(&path, blob).await?;
            println!("Wrote {} item(s) to {}", list.items.len(), path.display());
        }
    }

    Ok(())
}
