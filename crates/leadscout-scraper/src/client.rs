//! HTTP client for scraping contact emails from business websites.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::extract::extract_emails;
use crate::rate_limit::retry_with_backoff;

/// Fetches business websites and extracts contact emails from their HTML.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct SiteScraper {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl SiteScraper {
    /// Creates a `SiteScraper` with configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for retriable errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches `website` and returns every contact email found in its HTML.
    ///
    /// The URL may omit its scheme (business listings often carry bare
    /// domains); `https://` is prepended when missing. Zero extracted
    /// emails is a success — many sites simply publish no address.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ScrapeError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScrapeError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`ScrapeError::Http`] — network or TLS failure after all retries exhausted.
    pub async fn scrape_emails(&self, website: &str) -> Result<Vec<String>, ScrapeError> {
        let url = normalize_website_url(website);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScrapeError::RateLimited {
                        domain: extract_domain(&url),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScrapeError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScrapeError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                let emails = extract_emails(&body);
                tracing::debug!(url, found = emails.len(), "scraped website for emails");
                Ok(emails)
            }
        })
        .await
    }
}

/// Prepends `https://` when the stored website has no scheme.
///
/// Listings frequently carry `www.example.com` rather than a full URL.
pub(crate) fn normalize_website_url(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
fn extract_domain(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme.split('/').next().unwrap_or(url).to_owned()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
