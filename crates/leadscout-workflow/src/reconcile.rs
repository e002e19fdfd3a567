//! The list reconciler: mapping save intents onto store operations.
//!
//! A save either creates a new named list or appends to an existing one.
//! Either way exactly one store call is issued for the whole batch, so a
//! conflict or missing target can never leave a partial batch behind.

use serde::Deserialize;
use uuid::Uuid;

use leadscout_core::{Lead, SavedList};

use crate::error::WorkflowError;
use crate::traits::LeadStore;

/// Where a save should land.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTarget {
    /// Create a list with this name; fails if the name is taken.
    NewList { name: String },
    /// Append to the list with this id; fails if it does not exist.
    Existing { id: Uuid },
}

/// Persists `items` (in order) according to `target`.
///
/// New-list names are trimmed before use; an empty name never reaches the
/// store. Appends never deduplicate — lists are append logs of save
/// actions, so saving the structurally identical lead twice yields two
/// entries by design.
///
/// # Errors
///
/// - [`WorkflowError::EmptyListName`] — new-list target with a blank name.
/// - [`WorkflowError::ListNameConflict`] — the name is already taken.
/// - [`WorkflowError::ListNotFound`] — the append target does not exist.
/// - [`WorkflowError::Persistence`] — the store itself failed.
pub async fn save_leads(
    store: &dyn LeadStore,
    items: &[Lead],
    target: &SaveTarget,
) -> Result<SavedList, WorkflowError> {
    match target {
        SaveTarget::NewList { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(WorkflowError::EmptyListName);
            }
            let list = store.create_list(name, items).await?;
            tracing::info!(list = %list.name, items = items.len(), "created list");
            Ok(list)
        }
        SaveTarget::Existing { id } => {
            let list = store.append_to_list(*id, items).await?;
            tracing::info!(list = %list.name, appended = items.len(), "appended to list");
            Ok(list)
        }
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
