//! The enrichment coordinator: website-to-email scraping over the
//! canonical result set.
//!
//! Bulk enrichment is sequential as a matter of policy, not convenience:
//! one in-flight scrape at a time keeps pressure off third-party websites.
//! Anyone raising [`SCRAPE_CONCURRENCY`] must keep per-item failure
//! isolation and must not reorder the per-item progress this module logs.

use serde::Serialize;

use leadscout_core::Lead;

use crate::error::WorkflowError;
use crate::traits::EmailScraper;

/// Number of scrapes in flight during [`enrich_leads`].
pub const SCRAPE_CONCURRENCY: usize = 1;

/// Aggregate outcome of a bulk enrichment pass.
///
/// Counts only reflect successful scrapes; a failed item contributes a
/// [`EnrichFailure`] entry instead.
#[derive(Debug, Default, Serialize)]
pub struct EnrichReport {
    /// Total emails found across all successfully scraped items.
    pub emails_found: usize,
    /// Items that ended the pass with at least one email.
    pub items_with_emails: usize,
    /// Per-item scrape failures, in pass order.
    pub failures: Vec<EnrichFailure>,
}

#[derive(Debug, Serialize)]
pub struct EnrichFailure {
    pub index: usize,
    pub name: String,
    pub error: String,
}

/// Scrapes one lead's website and replaces its emails on success.
///
/// A lead without a website is skipped without touching the scraper —
/// `Ok(0)` and no side effects. On a successful scrape the previous email
/// list is replaced wholesale (a later successful scrape always wins, even
/// when it found fewer addresses). On failure `lead.emails` is untouched.
///
/// # Errors
///
/// Propagates the scraper's [`WorkflowError::Scrape`].
pub(crate) async fn enrich_lead(
    scraper: &dyn EmailScraper,
    lead: &mut Lead,
) -> Result<usize, WorkflowError> {
    let Some(url) = lead.website.clone().filter(|w| !w.is_empty()) else {
        return Ok(0);
    };

    let emails = scraper.scrape_emails(&url).await?;
    let found = emails.len();
    lead.emails = emails;
    Ok(found)
}

/// Enriches every lead with a website, one at a time, accumulating an
/// aggregate report.
///
/// A single item's failure is logged, recorded in the report, and does not
/// stop the pass. The slice is mutated in place as the pass proceeds, so a
/// caller sharing the set with a renderer observes partial progress rather
/// than one final snapshot.
pub(crate) async fn enrich_leads(scraper: &dyn EmailScraper, leads: &mut [Lead]) -> EnrichReport {
    let mut report = EnrichReport::default();

    for (index, lead) in leads.iter_mut().enumerate() {
        if !lead.has_website() {
            continue;
        }
        match enrich_lead(scraper, lead).await {
            Ok(found) => {
                report.emails_found += found;
                if !lead.emails.is_empty() {
                    report.items_with_emails += 1;
                }
                tracing::debug!(index, name = %lead.name, found, "enriched lead");
            }
            Err(e) => {
                tracing::warn!(index, name = %lead.name, error = %e, "lead enrichment failed");
                report.failures.push(EnrichFailure {
                    index,
                    name: lead.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        emails_found = report.emails_found,
        items_with_emails = report.items_with_emails,
        failures = report.failures.len(),
        "bulk enrichment finished"
    );
    report
}
