//! Error taxonomy for the workflow operations.
//!
//! Every operation surfaces exactly one of these variants to its caller;
//! the presentation layer maps them to user-visible notifications. Only
//! `enrich_all` swallows anything, and then only per-item `Scrape` errors,
//! which it folds into its aggregate report instead of re-raising.

use thiserror::Error;
use uuid::Uuid;

use leadscout_core::QueryError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad user input; never reaches the network. Re-prompt and retry.
    #[error(transparent)]
    Validation(#[from] QueryError),

    /// An operation referenced a result index that is not in the canonical
    /// set — the presentation layer and session have drifted apart.
    #[error("no result at index {index}")]
    UnknownResult { index: usize },

    /// Save was asked to create a list without a usable name.
    #[error("list name must not be empty")]
    EmptyListName,

    /// The search provider failed. Session state is rolled back, so
    /// retrying the same operation is safe.
    #[error("search provider request failed: {source}")]
    Fetch {
        #[source]
        source: BoxError,
    },

    /// One website scrape failed. Non-fatal: isolated to a single result,
    /// the rest of a batch proceeds.
    #[error("scraping {url} failed: {source}")]
    Scrape {
        url: String,
        #[source]
        source: BoxError,
    },

    /// A new list collides with an existing name. Nothing was persisted.
    #[error("a list named \"{name}\" already exists")]
    ListNameConflict { name: String },

    /// The targeted list does not exist. Nothing was persisted.
    #[error("no saved list with id {id}")]
    ListNotFound { id: Uuid },

    /// The persistence store itself failed.
    #[error("persistence failure: {source}")]
    Persistence {
        #[source]
        source: BoxError,
    },
}

impl WorkflowError {
    pub(crate) fn fetch(source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            source: source.into(),
        }
    }

    pub(crate) fn scrape(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Scrape {
            url: url.into(),
            source: source.into(),
        }
    }

    pub(crate) fn persistence(source: impl Into<BoxError>) -> Self {
        Self::Persistence {
            source: source.into(),
        }
    }
}
