//! The search session: canonical results, pagination, display window.
//!
//! "Replace" and "append" are two distinct entry points — [`SearchSession::search`]
//! is the only operation that discards the previous result set, and
//! [`SearchSession::load_more`] only ever concatenates. State mutations
//! happen strictly after a successful provider response, so any fetch
//! failure leaves the session exactly as it was and a retry is safe.

use leadscout_core::{display, Lead, SavedList, SearchQuery};

use crate::enrich::{self, EnrichReport};
use crate::error::WorkflowError;
use crate::reconcile::{self, SaveTarget};
use crate::traits::{EmailScraper, LeadStore, SearchProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchPhase {
    Idle,
    Fetching,
}

/// One user's search workflow state.
///
/// The session owns the canonical result set. Nothing else mutates it:
/// pagination appends, enrichment rewrites individual `emails` fields, and
/// saves clone snapshots out of it. Callers must not run two operations on
/// the same session concurrently (the exclusive borrows enforce this in
/// process; transports serialize access per session).
pub struct SearchSession {
    query: Option<SearchQuery>,
    results: Vec<Lead>,
    next_token: Option<String>,
    phase: FetchPhase,
    visible_len: usize,
    page_size: usize,
}

impl SearchSession {
    /// Creates an idle session. `page_size` controls how many results each
    /// display-window step reveals.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            query: None,
            results: Vec::new(),
            next_token: None,
            phase: FetchPhase::Idle,
            visible_len: 0,
            page_size: page_size.max(1),
        }
    }

    /// The canonical result set, in provider order.
    #[must_use]
    pub fn results(&self) -> &[Lead] {
        &self.results
    }

    /// The currently revealed prefix of the result set.
    #[must_use]
    pub fn visible(&self) -> &[Lead] {
        &self.results[..self.visible_len]
    }

    /// Whether the display window already covers the whole result set.
    #[must_use]
    pub fn all_shown(&self) -> bool {
        self.visible_len == self.results.len()
    }

    /// Whether the provider reported further pages.
    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.next_token.is_some()
    }

    #[must_use]
    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    /// Runs a fresh search, replacing the canonical result set.
    ///
    /// On success the previous results, continuation token, and display
    /// window are all discarded; the window restarts at the first page of
    /// the new set. On provider failure nothing changes — the previous
    /// results stay valid and retrying is safe.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Fetch`] when the provider fails.
    pub async fn search(
        &mut self,
        provider: &dyn SearchProvider,
        query: SearchQuery,
    ) -> Result<&[Lead], WorkflowError> {
        self.phase = FetchPhase::Fetching;
        let outcome = provider.fetch_page(&query, None).await;
        self.phase = FetchPhase::Idle;
        let page = outcome?;

        self.results = dedupe_structural(page.leads);
        self.next_token = page.next_token;
        self.query = Some(query);
        self.visible_len = display::reset(&self.results, self.page_size).len();

        tracing::info!(
            results = self.results.len(),
            has_more = self.next_token.is_some(),
            "search replaced result set"
        );
        Ok(&self.results)
    }

    /// Fetches the next provider page and appends it to the canonical set.
    ///
    /// A no-op returning an empty slice when no continuation token is held
    /// or a fetch is already in flight — this is what makes a double
    /// "load more" click harmless rather than a duplicate-token race. The
    /// stored token is consumed exactly once: it is only replaced after
    /// the provider answered, and a failed fetch retains it for retry.
    ///
    /// Appended leads that structurally duplicate an existing result are
    /// dropped; the rest keep provider order.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Fetch`] when the provider fails. The result set
    /// and token are left untouched in that case.
    pub async fn load_more(
        &mut self,
        provider: &dyn SearchProvider,
    ) -> Result<&[Lead], WorkflowError> {
        if self.phase == FetchPhase::Fetching {
            return Ok(&[]);
        }
        let (Some(query), Some(token)) = (self.query.clone(), self.next_token.clone()) else {
            return Ok(&[]);
        };

        self.phase = FetchPhase::Fetching;
        let outcome = provider.fetch_page(&query, Some(&token)).await;
        self.phase = FetchPhase::Idle;
        let page = outcome?;

        let appended_from = self.results.len();
        for lead in page.leads {
            let duplicate = self
                .results
                .iter()
                .any(|existing| existing.identity_key() == lead.identity_key());
            if !duplicate {
                self.results.push(lead);
            }
        }
        self.next_token = page.next_token;

        tracing::info!(
            appended = self.results.len() - appended_from,
            total = self.results.len(),
            has_more = self.next_token.is_some(),
            "load_more appended a page"
        );
        Ok(&self.results[appended_from..])
    }

    /// Reveals one more page of the already-fetched results.
    ///
    /// Purely local: grows the visible prefix by `page_size` (clamped to
    /// the set length) and reports whether everything is now shown. No
    /// provider traffic is involved, regardless of whether the set grew
    /// through [`Self::load_more`] since the last call.
    pub fn show_more(&mut self) -> (&[Lead], bool) {
        let (new_len, all_shown) = {
            let (window, all_shown) =
                display::show_more(&self.results, self.visible_len, self.page_size);
            (window.len(), all_shown)
        };
        self.visible_len = new_len;
        (&self.results[..new_len], all_shown)
    }

    /// Scrapes emails for the result at `index`.
    ///
    /// A no-op for results without a website. On success the result's
    /// emails are replaced with the scraped list; on failure they are left
    /// untouched and the error is surfaced for display.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::UnknownResult`] — `index` is out of range.
    /// - [`WorkflowError::Scrape`] — the scrape itself failed.
    pub async fn enrich_one(
        &mut self,
        scraper: &dyn EmailScraper,
        index: usize,
    ) -> Result<&Lead, WorkflowError> {
        let lead = self
            .results
            .get_mut(index)
            .ok_or(WorkflowError::UnknownResult { index })?;
        enrich::enrich_lead(scraper, lead).await?;
        Ok(&self.results[index])
    }

    /// Scrapes emails for every result with a website, sequentially.
    ///
    /// Individual failures are collected into the report and never abort
    /// the pass; see [`crate::enrich`] for the policy.
    pub async fn enrich_all(&mut self, scraper: &dyn EmailScraper) -> EnrichReport {
        enrich::enrich_leads(scraper, &mut self.results).await
    }

    /// Saves a snapshot of the result at `index` into `target`.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::UnknownResult`] for a bad index, otherwise
    /// whatever [`reconcile::save_leads`] surfaces.
    pub async fn save_one(
        &self,
        store: &dyn LeadStore,
        index: usize,
        target: &SaveTarget,
    ) -> Result<SavedList, WorkflowError> {
        let lead = self
            .results
            .get(index)
            .ok_or(WorkflowError::UnknownResult { index })?;
        reconcile::save_leads(store, std::slice::from_ref(lead), target).await
    }

    /// Saves a snapshot of the entire canonical result set into `target`
    /// as one batch.
    ///
    /// # Errors
    ///
    /// See [`reconcile::save_leads`].
    pub async fn save_all(
        &self,
        store: &dyn LeadStore,
        target: &SaveTarget,
    ) -> Result<SavedList, WorkflowError> {
        reconcile::save_leads(store, &self.results, target).await
    }
}

/// Drops later occurrences of structurally identical leads, keeping order.
fn dedupe_structural(leads: Vec<Lead>) -> Vec<Lead> {
    let mut unique: Vec<Lead> = Vec::with_capacity(leads.len());
    for lead in leads {
        let duplicate = unique
            .iter()
            .any(|existing| existing.identity_key() == lead.identity_key());
        if !duplicate {
            unique.push(lead);
        }
    }
    unique
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
