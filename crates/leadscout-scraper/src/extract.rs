//! Email extraction from raw HTML.
//!
//! No DOM parsing: a single pattern scan over the page body finds every
//! address, wherever it appears (visible text, `mailto:` hrefs, JSON-LD
//! blobs). Placeholder addresses that sites ship in markup templates are
//! filtered out, and duplicates collapse to their first occurrence so the
//! result order follows the page.

use regex::Regex;

/// An email containing any of these substrings (case-insensitive) is a
/// template placeholder, not a contact.
const PLACEHOLDER_MARKERS: &[&str] = &["example", "test", "your-email"];

/// Extracts contact email addresses from an HTML document.
///
/// Returns addresses in first-occurrence order, deduplicated exactly.
/// An empty result is a normal outcome for pages without contact info.
#[must_use]
pub fn extract_emails(html: &str) -> Vec<String> {
    let re = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("valid email regex");

    let mut emails: Vec<String> = Vec::new();
    for found in re.find_iter(html) {
        let email = found.as_str();
        if is_placeholder(email) {
            continue;
        }
        if emails.iter().any(|seen| seen == email) {
            continue;
        }
        emails.push(email.to_owned());
    }
    emails
}

fn is_placeholder(email: &str) -> bool {
    let lower = email.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
