//! HTTP client for the Google Maps web service.
//!
//! One [`PlacesClient::fetch_page`] call fans out across every location in
//! the query: geocode the location, run a nearby keyword search around the
//! geocoded center, and resolve each hit through the place-details endpoint.
//! Per-location `next_page_token`s are folded into a single composite
//! continuation token (see [`crate::pagination`]); passing that token back
//! resumes every location that still had pages.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, Url};

use leadscout_core::{Lead, LeadPage, SearchQuery};

use crate::error::PlacesError;
use crate::normalize::build_lead;
use crate::pagination::ContinuationState;
use crate::retry::retry_with_backoff;
use crate::types::{
    GeocodeResponse, LatLng, NearbySearchResponse, PlaceDetails, PlaceDetailsResponse, STATUS_OK,
    STATUS_OVER_QUERY_LIMIT, STATUS_ZERO_RESULTS,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

/// Radius used for the underlying nearby search when the query is in
/// exact-postal mode. The caller-supplied radius is ignored in that mode;
/// results are filtered by postal code instead, so the search just needs to
/// be wide enough to cover the code's area.
const EXACT_POSTAL_SEARCH_RADIUS_M: u32 = 50_000;

/// Fields requested from the place-details endpoint. Details are billed per
/// field group, so this stays limited to what [`Lead`] actually carries.
const DETAIL_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,geometry";

/// Client for the Google Maps geocoding, nearby-search, and place-details
/// endpoints.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
/// Transient failures (network errors, `OVER_QUERY_LIMIT`) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a new client pointed at the production Google Maps service.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, max_retries, backoff_base_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadscout/0.1 (lead-discovery)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::Api {
            status: "INVALID_BASE_URL".to_owned(),
            message: Some(format!("'{base_url}': {e}")),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms: backoff_base_secs.saturating_mul(1_000),
        })
    }

    /// Fetches one page of leads for `query`.
    ///
    /// With `token == None` this is a fresh fetch: every location in the
    /// query is geocoded and searched. With a token from a previous page,
    /// only the locations that still had provider-side pages are resumed.
    /// A location that fails to geocode is skipped with a warning rather
    /// than failing the whole fetch, matching how a partially-valid
    /// location set should still produce results.
    ///
    /// The returned page is deduplicated by place id, sorted by distance,
    /// and carries the composite continuation token (absent when every
    /// location is exhausted). In exact-postal mode only results whose
    /// extracted postal code equals the queried location string survive.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidToken`] — `token` was not produced by this
    ///   provider.
    /// - [`PlacesError::Api`] — the service rejected the request
    ///   (bad key, malformed parameters).
    /// - [`PlacesError::OverQueryLimit`] — quota exhausted after all
    ///   retries.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] — transport
    ///   or payload failure.
    pub async fn fetch_page(
        &self,
        query: &SearchQuery,
        token: Option<&str>,
    ) -> Result<LeadPage, PlacesError> {
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut leads: Vec<Lead> = Vec::new();
        let mut next_state: Vec<(String, String)> = Vec::new();

        match token {
            Some(raw) => {
                let state = ContinuationState::from_token(raw)?;
                for (location, page_token) in state.0 {
                    let Some(origin) = self.geocode(&location).await? else {
                        tracing::warn!(
                            %location,
                            "location no longer geocodes; dropping its continuation"
                        );
                        continue;
                    };
                    let page = self.nearby_continuation(&page_token).await?;
                    self.collect_page(query, &location, origin, &page.results, &mut seen_ids, &mut leads)
                        .await?;
                    if let Some(next) = page.next_page_token {
                        next_state.push((location, next));
                    }
                }
            }
            None => {
                let radius_m = if query.exact_postal() {
                    EXACT_POSTAL_SEARCH_RADIUS_M
                } else {
                    query.radius_m()
                };
                for location in query.locations() {
                    let Some(origin) = self.geocode(location).await? else {
                        tracing::warn!(%location, "location not found; skipping");
                        continue;
                    };
                    let page = self.nearby_page(origin, radius_m, query.term()).await?;
                    self.collect_page(query, location, origin, &page.results, &mut seen_ids, &mut leads)
                        .await?;
                    if let Some(next) = page.next_page_token {
                        next_state.push((location.clone(), next));
                    }
                }
            }
        }

        leads.sort_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(LeadPage {
            leads,
            next_token: ContinuationState(next_state).into_token(),
        })
    }

    /// Resolves each nearby hit through the details endpoint and appends
    /// the surviving leads.
    ///
    /// A details failure for one place is logged and skipped so a single
    /// bad entry cannot sink the page.
    async fn collect_page(
        &self,
        query: &SearchQuery,
        location: &str,
        origin: LatLng,
        hits: &[crate::types::NearbyPlace],
        seen_ids: &mut HashSet<String>,
        leads: &mut Vec<Lead>,
    ) -> Result<(), PlacesError> {
        for hit in hits {
            if !seen_ids.insert(hit.place_id.clone()) {
                continue;
            }

            let details = match self.place_details(&hit.place_id).await {
                Ok(Some(details)) => details,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(place_id = %hit.place_id, error = %e, "place details failed; skipping");
                    continue;
                }
            };

            let Some(lead) = build_lead(&details, &hit.place_id, origin) else {
                continue;
            };

            if query.exact_postal() && lead.postal_code.as_deref() != Some(location) {
                continue;
            }

            leads.push(lead);
        }
        Ok(())
    }

    /// Geocodes a free-form location string to coordinates.
    ///
    /// Returns `Ok(None)` when the service recognizes the request but finds
    /// nothing — an unknown location, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Api`], [`PlacesError::OverQueryLimit`],
    /// [`PlacesError::Http`], or [`PlacesError::Deserialize`].
    pub async fn geocode(&self, location: &str) -> Result<Option<LatLng>, PlacesError> {
        let url = self.build_url("maps/api/geocode/json", &[("address", location)]);
        let response: GeocodeResponse = self
            .request_with_retry(&url, &format!("geocode({location})"))
            .await?;
        check_api_status(&response.status, response.error_message)?;
        Ok(response.results.first().map(|r| r.geometry.location))
    }

    /// Runs a nearby keyword search around `center`.
    async fn nearby_page(
        &self,
        center: LatLng,
        radius_m: u32,
        keyword: &str,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let location = format!("{},{}", center.lat, center.lng);
        let radius = radius_m.to_string();
        let url = self.build_url(
            "maps/api/place/nearbysearch/json",
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword),
            ],
        );
        let response: NearbySearchResponse = self
            .request_with_retry(&url, &format!("nearbysearch({keyword})"))
            .await?;
        check_api_status(&response.status, response.error_message.clone())?;
        Ok(response)
    }

    /// Fetches the next nearby-search page for a provider page token.
    async fn nearby_continuation(
        &self,
        page_token: &str,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let url = self.build_url(
            "maps/api/place/nearbysearch/json",
            &[("pagetoken", page_token)],
        );
        let response: NearbySearchResponse = self
            .request_with_retry(&url, "nearbysearch(pagetoken)")
            .await?;
        check_api_status(&response.status, response.error_message.clone())?;
        Ok(response)
    }

    /// Looks up the detail fields for one place id.
    ///
    /// Returns `Ok(None)` when the place has vanished between the search
    /// and the lookup.
    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = self.build_url(
            "maps/api/place/details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        );
        let response: PlaceDetailsResponse = self
            .request_with_retry(&url, &format!("details({place_id})"))
            .await?;
        check_api_status(&response.status, response.error_message)?;
        Ok(response.result)
    }

    /// Sends a GET with retry, asserts a 2xx status, and parses the body.
    async fn request_with_retry<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let response = response.error_for_status()?;
                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| PlacesError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }

    /// Builds the full request URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }
}

/// Maps the in-band `status` field to our error taxonomy.
///
/// `OK` and `ZERO_RESULTS` are both successes — an empty page is a valid
/// outcome, not a failure.
fn check_api_status(status: &str, message: Option<String>) -> Result<(), PlacesError> {
    match status {
        STATUS_OK | STATUS_ZERO_RESULTS => Ok(()),
        STATUS_OVER_QUERY_LIMIT => Err(PlacesError::OverQueryLimit),
        other => Err(PlacesError::Api {
            status: other.to_owned(),
            message,
        }),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
