pub mod client;
pub mod error;
pub mod extract;
pub mod rate_limit;

pub use client::SiteScraper;
pub use error::ScrapeError;
pub use extract::extract_emails;
