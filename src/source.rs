//! The remote activity feed: a paginated, read-only list of raw events per
//! account. `GitHubSource` talks to the public REST API; tests substitute an
//! in-memory implementation of [`EventSource`].

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, LINK};
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::SourceError;

pub const API_BASE_URL: &str = "https://api.github.com";

/// Page size requested from the API.
pub const PER_PAGE: u32 = 30;

static NEXT_PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").expect("link page regex"));

/// An account whose activity is fetched, with its resolved credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub login: String,
    pub token: String,
}

impl Account {
    pub fn new(login: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("login", &self.login)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawActor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRepo {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// An event as delivered by the API; the payload is decoded later.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: RawActor,
    pub repo: RawRepo,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// One page of newest-first events plus the continuation token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    /// `None` once the feed is exhausted.
    pub next_page: Option<u32>,
}

/// Port for the paginated remote event feed.
pub trait EventSource: Send + Sync {
    /// Fetch one page. `page` is `None` for the first request and otherwise
    /// the `next_page` value returned by the previous call.
    fn list_events(&self, account: &Account, page: Option<u32>) -> Result<EventPage, SourceError>;
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

/// GitHub REST implementation of [`EventSource`].
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    base_url: Url,
}

impl GitHubSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("gitfamous/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url: String = base_url.into();
        let base_url = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(SourceError::InvalidBaseUrl { url: base_url })?;
        Ok(Self { client, base_url })
    }
}

/// `{base}/users/{login}/events/public`, with `login` escaped as a single
/// path segment.
pub fn events_url(base: &Url, login: &str) -> Result<Url, SourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::InvalidBaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(["users", login, "events", "public"]);
    Ok(url)
}

impl EventSource for GitHubSource {
    fn list_events(&self, account: &Account, page: Option<u32>) -> Result<EventPage, SourceError> {
        let url = events_url(&self.base_url, &account.login)?;
        debug!("GET {} page={:?}", url, page);

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .query(&[("per_page", PER_PAGE)]);
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }
        if !account.token.is_empty() {
            request = request.bearer_auth(&account.token);
        }

        let response = request.send()?;
        let status = response.status();
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_from_link);

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
            let message = response
                .json::<ApiMessage>()
                .map(|body| body.message)
                .unwrap_or(fallback);
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let events = response.json::<Vec<RawEvent>>()?;
        Ok(EventPage { events, next_page })
    }
}

/// Extract the page number of the `rel="next"` entry of a `Link` header.
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header
        .split(',')
        .find(|part| part.contains(r#"rel="next""#))
        .and_then(|part| NEXT_PAGE_RE.captures(part))
        .and_then(|caps| caps[1].parse().ok())
}
