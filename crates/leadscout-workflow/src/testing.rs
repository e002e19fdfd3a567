//! Scripted collaborators for workflow tests.
//!
//! [`MockProvider`] replays a fixed sequence of pages (or failures) and
//! records the token it was handed on every call; [`MockScraper`] answers
//! per-URL and keeps a call log. Both live in the library (not behind
//! `cfg(test)`) so downstream crates can drive the workflow in their own
//! tests without a network or a database.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use leadscout_core::{Lead, LeadPage, SearchQuery};

use crate::error::WorkflowError;
use crate::traits::{EmailScraper, SearchProvider};

/// Builds a minimal lead for tests.
#[must_use]
pub fn test_lead(name: &str, website: Option<&str>) -> Lead {
    Lead {
        name: name.to_owned(),
        address: format!("{name} street 1"),
        distance_m: 100.0,
        website: website.map(str::to_owned),
        phone: None,
        maps_url: None,
        postal_code: Some("10001".to_owned()),
        emails: Vec::new(),
    }
}

enum ScriptedPage {
    Page(LeadPage),
    Failure(String),
}

/// A [`SearchProvider`] that replays scripted pages in order.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<ScriptedPage>>,
    tokens_seen: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a page of leads with an optional continuation token.
    #[must_use]
    pub fn with_page(self, leads: Vec<Lead>, next_token: Option<&str>) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(ScriptedPage::Page(LeadPage {
                leads,
                next_token: next_token.map(str::to_owned),
            }));
        self
    }

    /// Queues a fetch failure.
    #[must_use]
    pub fn with_failure(self, message: &str) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(ScriptedPage::Failure(message.to_owned()));
        self
    }

    /// The continuation tokens received so far, one entry per call.
    #[must_use]
    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens_seen.lock().expect("tokens lock").clone()
    }

    /// How many times `fetch_page` was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.tokens_seen.lock().expect("tokens lock").len()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn fetch_page(
        &self,
        _query: &SearchQuery,
        token: Option<&str>,
    ) -> Result<LeadPage, WorkflowError> {
        self.tokens_seen
            .lock()
            .expect("tokens lock")
            .push(token.map(str::to_owned));

        match self.script.lock().expect("script lock").pop_front() {
            Some(ScriptedPage::Page(page)) => Ok(page),
            Some(ScriptedPage::Failure(message)) => Err(WorkflowError::fetch(message)),
            None => Ok(LeadPage::default()),
        }
    }
}

/// An [`EmailScraper`] answering from a per-URL table.
///
/// URLs without an entry scrape successfully with zero emails.
#[derive(Default)]
pub struct MockScraper {
    responses: Mutex<HashMap<String, Result<Vec<String>, String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockScraper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful scrape for `url`.
    #[must_use]
    pub fn with_emails(self, url: &str, emails: &[&str]) -> Self {
        self.responses.lock().expect("responses lock").insert(
            url.to_owned(),
            Ok(emails.iter().map(|e| (*e).to_owned()).collect()),
        );
        self
    }

    /// Scripts a scrape failure for `url`.
    #[must_use]
    pub fn with_failure(self, url: &str, message: &str) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(url.to_owned(), Err(message.to_owned()));
        self
    }

    /// The URLs scraped so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl EmailScraper for MockScraper {
    async fn scrape_emails(&self, url: &str) -> Result<Vec<String>, WorkflowError> {
        self.calls.lock().expect("calls lock").push(url.to_owned());
        match self.responses.lock().expect("responses lock").get(url) {
            Some(Ok(emails)) => Ok(emails.clone()),
            Some(Err(message)) => Err(WorkflowError::scrape(url, message.clone())),
            None => Ok(Vec::new()),
        }
    }
}
