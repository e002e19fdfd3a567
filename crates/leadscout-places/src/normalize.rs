//! Normalization from Places API shapes to domain [`Lead`]s.

use leadscout_core::Lead;

use crate::types::{LatLng, PlaceDetails};

/// Mean Earth radius in meters, for haversine distance.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
#[must_use]
pub fn haversine_distance_m(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Extracts a postal code from a formatted address.
///
/// A postal code here is a run of exactly 5 or 6 ASCII digits bounded by
/// non-alphanumeric characters. Formatted addresses put the postal code
/// near the end, after any street number, so the *last* qualifying run
/// wins.
#[must_use]
pub fn extract_postal_code(address: &str) -> Option<String> {
    let bytes = address.as_bytes();
    let mut found: Option<&str> = None;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let len = i - start;
            let left_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
            let right_ok = i == bytes.len() || !bytes[i].is_ascii_alphanumeric();
            if (5..=6).contains(&len) && left_ok && right_ok {
                found = Some(&address[start..i]);
            }
        } else {
            i += 1;
        }
    }

    found.map(str::to_owned)
}

/// Builds a domain [`Lead`] from place details.
///
/// `origin` is the geocoded center of the queried location; the lead's
/// distance is the haversine distance from it to the place. Returns `None`
/// when the details carry neither a name nor an address — such entries
/// cannot be identified structurally and are useless downstream.
#[must_use]
pub fn build_lead(details: &PlaceDetails, place_id: &str, origin: LatLng) -> Option<Lead> {
    let name = non_empty(details.name.as_deref())?;
    let address = non_empty(details.formatted_address.as_deref()).unwrap_or_default();

    let distance_m = details
        .geometry
        .map_or(0.0, |g| haversine_distance_m(origin, g.location));

    let postal_code = extract_postal_code(&address);

    Some(Lead {
        name,
        address,
        distance_m,
        website: non_empty(details.website.as_deref()),
        phone: non_empty(details.formatted_phone_number.as_deref()),
        maps_url: Some(format!(
            "https://www.google.com/maps/place/?q=place_id:{place_id}"
        )),
        postal_code,
        emails: Vec::new(),
    })
}

/// Treats empty strings as absent, like the rest of the pipeline does.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
