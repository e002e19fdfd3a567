//! Canonical search request construction.
//!
//! [`SearchQuery::build`] is the only way to obtain a query, so every query
//! that reaches a provider has already been trimmed, deduplicated, and
//! validated. Fields are private to keep a submitted query immutable.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("search term must not be empty")]
    EmptyTerm,
    #[error("at least one location is required")]
    NoLocations,
}

/// A validated, immutable search request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    term: String,
    locations: Vec<String>,
    radius_m: u32,
    exact_postal: bool,
}

impl SearchQuery {
    /// Normalizes raw user input into a canonical query.
    ///
    /// Trims the term and every location, drops locations that trim to
    /// empty or repeat an earlier entry (insertion order is preserved), and
    /// rejects an empty term or an empty location set.
    ///
    /// When `exact_postal` is set the radius is carried along unchanged but
    /// providers ignore it and filter by postal code instead.
    ///
    /// # Errors
    ///
    /// - [`QueryError::EmptyTerm`] if `term` is empty or whitespace.
    /// - [`QueryError::NoLocations`] if no location survives trimming.
    pub fn build(
        term: &str,
        locations: &[String],
        radius_m: u32,
        exact_postal: bool,
    ) -> Result<Self, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(QueryError::EmptyTerm);
        }

        let mut deduped: Vec<String> = Vec::with_capacity(locations.len());
        for raw in locations {
            let loc = raw.trim();
            if loc.is_empty() || deduped.iter().any(|seen| seen == loc) {
                continue;
            }
            deduped.push(loc.to_owned());
        }
        if deduped.is_empty() {
            return Err(QueryError::NoLocations);
        }

        Ok(Self {
            term: term.to_owned(),
            locations: deduped,
            radius_m,
            exact_postal,
        })
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Search radius in meters. Ignored by providers when
    /// [`Self::exact_postal`] is set.
    #[must_use]
    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    #[must_use]
    pub fn exact_postal(&self) -> bool {
        self.exact_postal
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
