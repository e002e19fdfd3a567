//! The `search` command: discover, optionally enrich, optionally save.

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use leadscout_core::{AppConfig, Lead, SearchQuery};
use leadscout_places::PlacesClient;
use leadscout_scraper::SiteScraper;
use leadscout_workflow::{PgLeadStore, SaveTarget, SearchSession};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Business type or keyword to search for
    #[arg(long)]
    term: String,

    /// Location or postal code; repeat the flag for multiple locations
    #[arg(long = "location", required = true)]
    locations: Vec<String>,

    /// Search radius in meters (ignored with --exact-postal)
    #[arg(long, default_value_t = 5_000)]
    radius_m: u32,

    /// Keep only results whose postal code equals the queried location
    #[arg(long)]
    exact_postal: bool,

    /// Maximum provider pages to fetch
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Scrape every result's website for contact emails
    #[arg(long)]
    enrich: bool,

    /// Save all results into a new list with this name
    #[arg(long, conflicts_with = "append_to")]
    save_new: Option<String>,

    /// Append all results to the saved list with this id
    #[arg(long)]
    append_to: Option<Uuid>,
}

pub async fn run(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .context("GOOGLE_MAPS_API_KEY is required for searches")?;
    let provider = PlacesClient::new(
        api_key,
        config.places_request_timeout_secs,
        config.places_max_retries,
        config.places_retry_backoff_base_secs,
    )?;

    let query = SearchQuery::build(&args.term, &args.locations, args.radius_m, args.exact_postal)?;
    let mut session = SearchSession::new(config.display_page_size);

    session.search(&provider, query).await?;
    for _ in 1..args.pages {
        if !session.has_more_pages() {
            break;
        }
        let appended = session.load_more(&provider).await?;
        tracing::info!(appended = appended.len(), "fetched another page");
    }

    if session.results().is_empty() {
        println!("No results.");
        return Ok(());
    }

    if args.enrich {
        let scraper = SiteScraper::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )?;
        let report = session.enrich_all(&scraper).await;
        println!(
            "Enrichment: {} email(s) across {} result(s), {} failure(s)",
            report.emails_found,
            report.items_with_emails,
            report.failures.len()
        );
        for failure in &report.failures {
            println!("  failed: {} ({})", failure.name, failure.error);
        }
    }

    print_results(session.results());

    let target = match (args.save_new, args.append_to) {
        (Some(name), None) => Some(SaveTarget::NewList { name }),
        (None, Some(id)) => Some(SaveTarget::Existing { id }),
        (None, None) => None,
        (Some(_), Some(_)) => unreachable!("clap rejects conflicting save flags"),
    };
    if let Some(target) = target {
        let pool = leadscout_db::connect_pool(
            &config.database_url,
            leadscout_db::PoolConfig::from_app_config(config),
        )
        .await?;
        leadscout_db::run_migrations(&pool).await?;
        let store = PgLeadStore::new(pool);

        let saved = session.save_all(&store, &target).await?;
        println!(
            "Saved {} result(s) to \"{}\" ({})",
            saved.items.len(),
            saved.name,
            saved.id
        );
    }

    Ok(())
}

fn print_results(leads: &[Lead]) {
    println!("{} result(s):", leads.len());
    for (index, lead) in leads.iter().enumerate() {
        let distance_km = lead.distance_m / 1000.0;
        println!("{:>3}. {}  ({distance_km:.2} km)", index + 1, lead.name);
        println!("     {}", lead.address);
        if let Some(phone) = &lead.phone {
            println!("     tel: {phone}");
        }
        if let Some(website) = &lead.website {
            println!("     web: {website}");
        }
        if !lead.emails.is_empty() {
            println!("     email: {}", lead.emails.join(", "));
        }
    }
}
