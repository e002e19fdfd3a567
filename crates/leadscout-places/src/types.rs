//! Wire types for the Google Maps web service endpoints we consume.
//!
//! Every response carries a `status` string alongside the payload;
//! [`crate::client::PlacesClient`] checks it before touching the data.
//! Fields we never read are simply not declared.

use serde::Deserialize;

/// `status` value shared by all endpoints for a successful call.
pub const STATUS_OK: &str = "OK";
/// `status` value for a well-formed query that matched nothing.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
/// `status` value for exhausted quota; worth retrying after a backoff.
pub const STATUS_OVER_QUERY_LIMIT: &str = "OVER_QUERY_LIMIT";

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyPlace {
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    pub result: Option<PlaceDetails>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub geometry: Option<Geometry>,
}
