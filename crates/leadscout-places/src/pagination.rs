//! Composite continuation tokens for multi-location searches.
//!
//! Google's nearby search pages per *request*, but one of our fetches fans
//! out across every queried location. The continuation token we hand back
//! therefore bundles the provider's per-location `next_page_token`s into a
//! single opaque string: a JSON array of `[location, provider_token]`
//! pairs, in query order. Locations whose results are exhausted simply
//! drop out of the array; an empty array means no token at all.

use serde::{Deserialize, Serialize};

use crate::error::PlacesError;

/// Per-location provider cursors still holding unfetched pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ContinuationState(pub(crate) Vec<(String, String)>);

impl ContinuationState {
    /// Encodes the state into the opaque token handed to callers.
    ///
    /// Returns `None` when no location has further pages, which callers
    /// must interpret as end-of-results.
    pub(crate) fn into_token(self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        // Serializing Vec<(String, String)> cannot fail.
        Some(serde_json::to_string(&self.0).unwrap_or_default())
    }

    /// Decodes a token previously produced by [`Self::into_token`].
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::InvalidToken`] if the token is not ours —
    /// the workflow never inspects tokens, so this indicates a caller
    /// mixing tokens across providers.
    pub(crate) fn from_token(token: &str) -> Result<Self, PlacesError> {
        let pairs: Vec<(String, String)> =
            serde_json::from_str(token).map_err(|e| PlacesError::InvalidToken {
                reason: e.to_string(),
            })?;
        if pairs.is_empty() {
            return Err(PlacesError::InvalidToken {
                reason: "token contains no continuation entries".to_owned(),
            });
        }
        Ok(Self(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pairs: &[(&str, &str)]) -> ContinuationState {
        ContinuationState(
            pairs
                .iter()
                .map(|(l, t)| ((*l).to_owned(), (*t).to_owned()))
                .collect(),
        )
    }

    #[test]
    fn empty_state_encodes_to_no_token() {
        assert!(state(&[]).into_token().is_none());
    }

    #[test]
    fn round_trips_preserving_location_order() {
        let original = state(&[("10001", "tok-a"), ("Brooklyn", "tok-b")]);
        let token = original.clone().into_token().expect("token");
        let decoded = ContinuationState::from_token(&token).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = ContinuationState::from_token("definitely-not-json").unwrap_err();
        assert!(matches!(err, PlacesError::InvalidToken { .. }));
    }

    #[test]
    fn rejects_empty_token_payload() {
        let err = ContinuationState::from_token("[]").unwrap_err();
        assert!(matches!(err, PlacesError::InvalidToken { .. }));
    }
}
