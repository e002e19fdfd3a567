//! Domain types shared by the search, enrichment, and persistence layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single business discovered by a search.
///
/// Search providers return no stable identifier before a lead is saved, so
/// identity is structural: two leads are the same business when name,
/// address, and website all match (see [`Lead::identity_key`]).
///
/// `emails` starts empty and is only ever written by the enrichment
/// coordinator; a fresh successful scrape replaces the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub address: String,
    /// Distance in meters from the geocoded center of the queried location.
    pub distance_m: f64,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub maps_url: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

impl Lead {
    /// Structural identity: (name, address, website).
    #[must_use]
    pub fn identity_key(&self) -> (&str, &str, Option<&str>) {
        (
            self.name.as_str(),
            self.address.as_str(),
            self.website.as_deref(),
        )
    }

    /// Whether this lead can be enriched at all.
    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.is_empty())
    }
}

/// One page of provider results.
///
/// `next_token` is opaque to everything except the provider that issued it;
/// `None` means the final page has been reached. An empty page with no token
/// is a valid end-of-results outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct LeadPage {
    pub leads: Vec<Lead>,
    pub next_token: Option<String>,
}

/// A persisted, named collection of leads.
///
/// Lists are append logs of save actions: saving the same lead twice into
/// one list yields two entries. Items are snapshots — enriching the live
/// result set after a save never changes a stored list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedList {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<Lead>,
    pub created_at: DateTime<Utc>,
}

/// List metadata without the item payload, for overview endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedListSummary {
    pub id: Uuid,
    pub name: String,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}
