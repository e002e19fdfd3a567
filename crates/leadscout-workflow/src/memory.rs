//! In-memory [`LeadStore`] for tests and offline runs.
//!
//! Mirrors the Postgres store's semantics exactly — case-sensitive unique
//! names, append-log items, newest-first summaries — so workflow tests
//! exercise the same contract the real store honors.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use leadscout_core::{Lead, SavedList, SavedListSummary};

use crate::error::WorkflowError;
use crate::traits::LeadStore;

#[derive(Default)]
pub struct MemoryLeadStore {
    lists: Mutex<Vec<SavedList>>,
}

impl MemoryLeadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Vec<SavedList>> {
        // Lock poisoning only happens if a test already panicked.
        self.lists.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create_list(&self, name: &str, items: &[Lead]) -> Result<SavedList, WorkflowError> {
        let mut lists = self.locked();
        if lists.iter().any(|l| l.name == name) {
            return Err(WorkflowError::ListNameConflict {
                name: name.to_owned(),
            });
        }
        let list = SavedList {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            items: items.to_vec(),
            created_at: Utc::now(),
        };
        lists.push(list.clone());
        Ok(list)
    }

    async fn append_to_list(&self, id: Uuid, items: &[Lead]) -> Result<SavedList, WorkflowError> {
        let mut lists = self.locked();
        let list = lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(WorkflowError::ListNotFound { id })?;
        list.items.extend(items.iter().cloned());
        Ok(list.clone())
    }

    async fn get_lists(&self) -> Result<Vec<SavedListSummary>, WorkflowError> {
        // Insertion order is creation order; newest first means reversed.
        Ok(self
            .locked()
            .iter()
            .rev()
            .map(|l| SavedListSummary {
                id: l.id,
                name: l.name.clone(),
                item_count: i64::try_from(l.items.len()).unwrap_or(i64::MAX),
                created_at: l.created_at,
            })
            .collect())
    }

    async fn get_list(&self, id: Uuid) -> Result<SavedList, WorkflowError> {
        self.locked()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(WorkflowError::ListNotFound { id })
    }

    async fn delete_list(&self, id: Uuid) -> Result<(), WorkflowError> {
        let mut lists = self.locked();
        let before = lists.len();
        lists.retain(|l| l.id != id);
        if lists.len() == before {
            return Err(WorkflowError::ListNotFound { id });
        }
        Ok(())
    }

    async fn export_csv(&self, id: Uuid) -> Result<Vec<u8>, WorkflowError> {
        let list = self.get_list(id).await?;
        Ok(leadscout_db::render_csv(&list).into_bytes())
    }
}
