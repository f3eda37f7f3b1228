//! Per-account lifecycle: `Loading` until its single fetch completes, then
//! `Loaded` or `Error` for the rest of the session.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::event::Event;
use crate::fetch::FetchRequest;
use crate::layout::LayoutProfile;
use crate::table::EventTable;

#[derive(Debug)]
pub enum TabState {
    Loading,
    Loaded { events: Vec<Event>, table: EventTable },
    Error(FetchError),
}

impl TabState {
    pub fn label(&self) -> &'static str {
        match self {
            TabState::Loading => "loading",
            TabState::Loaded { .. } => "loaded",
            TabState::Error(_) => "error",
        }
    }
}

#[derive(Debug)]
pub struct Tab {
    pub request: FetchRequest,
    pub state: TabState,
}

impl Tab {
    pub fn new(request: FetchRequest) -> Self {
        Self {
            request,
            state: TabState::Loading,
        }
    }

    pub fn login(&self) -> &str {
        &self.request.account.login
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, TabState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TabState::Loaded { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            TabState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn events(&self) -> &[Event] {
        match &self.state {
            TabState::Loaded { events, .. } => events,
            _ => &[],
        }
    }

    /// Apply a completion. Returns `false`, leaving the tab untouched, when it
    /// has already left `Loading`.
    ///
    /// With `empty_is_loaded`, `NoResults` becomes a `Loaded` tab with no rows.
    pub fn complete(
        &mut self,
        result: Result<Vec<Event>, FetchError>,
        width: Option<u16>,
        profile: LayoutProfile,
        empty_is_loaded: bool,
    ) -> bool {
        if !self.is_loading() {
            debug!("{}: ignoring completion, tab already {}", self.login(), self.state.label());
            return false;
        }

        self.state = match result {
            Ok(events) => {
                let table = EventTable::new(width, &events, profile);
                TabState::Loaded { events, table }
            }
            Err(err) if empty_is_loaded && err.is_no_results() => TabState::Loaded {
                events: Vec::new(),
                table: EventTable::new(width, &[], profile),
            },
            Err(err) => {
                warn!("{}: {}", self.login(), err);
                TabState::Error(err)
            }
        };
        true
    }

    /// Recompute the table for a new terminal width. No-op unless loaded.
    pub fn relayout(&mut self, width: Option<u16>) {
        if let TabState::Loaded { events, table } = &mut self.state {
            table.relayout(width, events);
        }
    }

    /// The event under the cursor, if any.
    pub fn selected_event(&self) -> Option<&Event> {
        match &self.state {
            TabState::Loaded { events, table } => table.selected().and_then(|i| events.get(i)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::event::{Actor, Repo};
    use crate::source::Account;
    use chrono::{TimeZone, Utc};

    fn tab() -> Tab {
        Tab::new(FetchRequest::new(Account::new("octocat", "token")))
    }

    fn event(repo: &str) -> Event {
        Event {
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            date: "1 day ago".to_string(),
            kind: "WatchEvent".to_string(),
            actor: Actor {
                login: "octocat".to_string(),
                avatar_url: String::new(),
            },
            repo: Repo {
                name: repo.to_string(),
                url: String::new(),
            },
            description: "Starred repository".to_string(),
        }
    }

    fn no_results() -> FetchError {
        FetchError::NoResults {
            login: "octocat".to_string(),
            since: "1d".to_string(),
        }
    }

    #[test]
    fn test_new_tab_is_loading() {
        let tab = tab();
        assert!(tab.is_loading());
        assert!(tab.events().is_empty());
        assert!(tab.selected_event().is_none());
    }

    #[test]
    fn test_complete_with_events() {
        let mut tab = tab();
        assert!(tab.complete(Ok(vec![event("a/b"), event("c/d")]), Some(80), LayoutProfile::SINGLE, false));
        assert!(tab.is_loaded());
        assert_eq!(tab.events().len(), 2);
        assert_eq!(tab.selected_event().map(|e| e.repo.name.as_str()), Some("a/b"));
    }

    #[test]
    fn test_completion_is_applied_once() {
        let mut tab = tab();
        assert!(tab.complete(Ok(vec![event("a/b")]), Some(80), LayoutProfile::DASHBOARD, true));

        let late = Err(FetchError::SourceUnavailable {
            login: "octocat".to_string(),
            source: SourceError::Status {
                status: 500,
                message: "boom".to_string(),
            },
        });
        assert!(!tab.complete(late, Some(80), LayoutProfile::DASHBOARD, true));
        assert!(tab.is_loaded());
        assert_eq!(tab.events().len(), 1);
    }

    #[test]
    fn test_no_results_as_empty_loaded() {
        let mut tab = tab();
        tab.complete(Err(no_results()), None, LayoutProfile::DASHBOARD, true);
        assert!(tab.is_loaded());
        assert!(tab.events().is_empty());
        assert!(tab.error().is_none());
    }

    #[test]
    fn test_no_results_as_error() {
        let mut tab = tab();
        tab.complete(Err(no_results()), None, LayoutProfile::SINGLE, false);
        assert!(tab.error().is_some_and(FetchError::is_no_results));
        assert_eq!(tab.state.label(), "error");
    }
}
