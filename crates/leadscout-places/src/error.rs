use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Places API returned status {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Api {
        status: String,
        message: Option<String>,
    },

    #[error("query rate exceeded for the Places API")]
    OverQueryLimit,

    #[error("malformed continuation token: {reason}")]
    InvalidToken { reason: String },
}
