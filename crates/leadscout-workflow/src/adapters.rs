//! Production wiring: concrete clients behind the workflow seams.
//!
//! The places client and site scraper implement their traits directly;
//! Postgres persistence gets a thin newtype over the pool because the
//! db crate exposes free functions rather than a struct.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use leadscout_core::{Lead, LeadPage, SavedList, SavedListSummary, SearchQuery};
use leadscout_db::DbError;
use leadscout_places::PlacesClient;
use leadscout_scraper::SiteScraper;

use crate::error::WorkflowError;
use crate::traits::{EmailScraper, LeadStore, SearchProvider};

#[async_trait]
impl SearchProvider for PlacesClient {
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        token: Option<&str>,
    ) -> Result<LeadPage, WorkflowError> {
        PlacesClient::fetch_page(self, query, token)
            .await
            .map_err(WorkflowError::fetch)
    }
}

#[async_trait]
impl EmailScraper for SiteScraper {
    async fn scrape_emails(&self, url: &str) -> Result<Vec<String>, WorkflowError> {
        SiteScraper::scrape_emails(self, url)
            .await
            .map_err(|e| WorkflowError::scrape(url, e))
    }
}

/// [`LeadStore`] backed by the Postgres list tables.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn create_list(&self, name: &str, items: &[Lead]) -> Result<SavedList, WorkflowError> {
        leadscout_db::create_list(&self.pool, name, items)
            .await
            .map_err(|e| match e {
                DbError::NameTaken(name) => WorkflowError::ListNameConflict { name },
                other => WorkflowError::persistence(other),
            })
    }

    async fn append_to_list(&self, id: Uuid, items: &[Lead]) -> Result<SavedList, WorkflowError> {
        leadscout_db::append_to_list(&self.pool, id, items)
            .await
            .map_err(|e| map_list_error(e, id))
    }

    async fn get_lists(&self) -> Result<Vec<SavedListSummary>, WorkflowError> {
        leadscout_db::list_lists(&self.pool)
            .await
            .map_err(WorkflowError::persistence)
    }

    async fn get_list(&self, id: Uuid) -> Result<SavedList, WorkflowError> {
        leadscout_db::get_list(&self.pool, id)
            .await
            .map_err(|e| map_list_error(e, id))
    }

    async fn delete_list(&self, id: Uuid) -> Result<(), WorkflowError> {
        leadscout_db::delete_list(&self.pool, id)
            .await
            .map_err(|e| map_list_error(e, id))
    }

    async fn export_csv(&self, id: Uuid) -> Result<Vec<u8>, WorkflowError> {
        let list = self.get_list(id).await?;
        Ok(leadscout_db::render_csv(&list).into_bytes())
    }
}

fn map_list_error(e: DbError, id: Uuid) -> WorkflowError {
    match e {
        DbError::NotFound => WorkflowError::ListNotFound { id },
        other => WorkflowError::persistence(other),
    }
}
