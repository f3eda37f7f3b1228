//! Paginated fetch with a time cutoff, a type allow-list and a result cap.

use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::dashboard::Message;
use crate::duration::describe_lookback;
use crate::error::FetchError;
use crate::event::Event;
use crate::source::{Account, EventSource, RawEvent};

/// Everything needed to fetch one account's activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub account: Account,
    /// Maximum accepted events; 0 means unbounded.
    pub cap: usize,
    /// Maximum event age; zero means unbounded.
    pub lookback: Duration,
    /// Accepted type tags; empty accepts every tag.
    pub allowed_types: Vec<String>,
}

impl FetchRequest {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            cap: 0,
            lookback: Duration::ZERO,
            allowed_types: Vec::new(),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_allowed_types(mut self, allowed_types: Vec<String>) -> Self {
        self.allowed_types = allowed_types;
        self
    }

    fn allows(&self, kind: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == kind)
    }

    fn cap_reached(&self, accepted: usize) -> bool {
        self.cap > 0 && accepted >= self.cap
    }
}

/// Page through `source` newest-first and return the accepted events.
///
/// Scanning stops for good at the first event at or before `now - lookback`,
/// when the cap is reached, or when the source has no further pages.
/// Events rejected by the type filter never count toward the cap.
pub fn fetch_events(
    source: &dyn EventSource,
    clock: &dyn Clock,
    request: &FetchRequest,
) -> Result<Vec<Event>, FetchError> {
    let login = &request.account.login;
    let now = clock.now();
    let cutoff = if request.lookback.is_zero() {
        None
    } else {
        chrono::Duration::from_std(request.lookback)
            .ok()
            .and_then(|lookback| now.checked_sub_signed(lookback))
    };

    let mut accepted: Vec<RawEvent> = Vec::new();
    let mut page = None;
    let mut pages_read = 0usize;

    'pages: loop {
        let response = source
            .list_events(&request.account, page)
            .map_err(|source| FetchError::SourceUnavailable {
                login: login.clone(),
                source,
            })?;
        pages_read += 1;

        for raw in response.events {
            if let Some(cutoff) = cutoff {
                if raw.created_at <= cutoff {
                    debug!("{}: reached lookback cutoff at {}", login, raw.created_at);
                    break 'pages;
                }
            }
            if !request.allows(&raw.kind) {
                continue;
            }
            accepted.push(raw);
            if request.cap_reached(accepted.len()) {
                break 'pages;
            }
        }

        match response.next_page {
            Some(next) => page = Some(next),
            None => break,
        }
    }

    info!(
        "{}: accepted {} events from {} page(s)",
        login,
        accepted.len(),
        pages_read
    );

    if accepted.is_empty() {
        return Err(FetchError::NoResults {
            login: login.clone(),
            since: describe_lookback(request.lookback),
        });
    }

    Ok(accepted
        .into_iter()
        .map(|raw| Event::from_raw(raw, now))
        .collect())
}

/// Run one fetch per request on its own thread. Each thread sends exactly one
/// [`Message::FetchCompleted`] addressed to the request's index.
pub fn spawn_fetches(
    requests: Vec<FetchRequest>,
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    sender: Sender<Message>,
) {
    for (tab, request) in requests.into_iter().enumerate() {
        let source = Arc::clone(&source);
        let clock = Arc::clone(&clock);
        let sender = sender.clone();

        std::thread::spawn(move || {
            let result = fetch_events(source.as_ref(), clock.as_ref(), &request);
            if sender.send(Message::FetchCompleted { tab, result }).is_err() {
                // Receiver dropped, the session has ended
                debug!("discarding result for {}: dashboard closed", request.account.login);
            }
        });
    }
}
