pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod retry;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
