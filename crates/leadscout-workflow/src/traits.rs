//! Collaborator contracts consumed by the workflow.
//!
//! The workflow never talks to Google, a website, or Postgres directly —
//! it goes through these seams. Production wiring lives in
//! [`crate::adapters`]; tests use [`crate::testing`] and
//! [`crate::memory`].

use async_trait::async_trait;
use uuid::Uuid;

use leadscout_core::{Lead, LeadPage, SavedList, SavedListSummary, SearchQuery};

use crate::error::WorkflowError;

/// A paginated business search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetches one page of results for `query`.
    ///
    /// `token == None` requests the first page; otherwise `token` must be
    /// a value previously returned in [`LeadPage::next_token`] for the
    /// same query. Fetching the same token twice must yield the same page
    /// (the session relies on this to make retries safe).
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        token: Option<&str>,
    ) -> Result<LeadPage, WorkflowError>;
}

/// A website-to-email scraping backend.
#[async_trait]
pub trait EmailScraper: Send + Sync {
    /// Scrapes contact emails from `url`.
    ///
    /// An empty vector is a successful scrape of a page that publishes no
    /// addresses — distinct from an `Err`, which leaves the target lead
    /// untouched.
    async fn scrape_emails(&self, url: &str) -> Result<Vec<String>, WorkflowError>;
}

/// Persistence for named lead lists.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Creates a list, failing with [`WorkflowError::ListNameConflict`]
    /// when the name is taken. All-or-nothing: on error nothing persists.
    async fn create_list(&self, name: &str, items: &[Lead]) -> Result<SavedList, WorkflowError>;

    /// Appends items to an existing list, failing with
    /// [`WorkflowError::ListNotFound`] when the id is unknown. Appends do
    /// not deduplicate.
    async fn append_to_list(&self, id: Uuid, items: &[Lead]) -> Result<SavedList, WorkflowError>;

    /// All lists, newest first, without item payloads.
    async fn get_lists(&self) -> Result<Vec<SavedListSummary>, WorkflowError>;

    async fn get_list(&self, id: Uuid) -> Result<SavedList, WorkflowError>;

    async fn delete_list(&self, id: Uuid) -> Result<(), WorkflowError>;

    /// Renders the list as a downloadable blob. The format is opaque to
    /// the workflow; callers only stream it through.
    async fn export_csv(&self, id: Uuid) -> Result<Vec<u8>, WorkflowError>;
}
