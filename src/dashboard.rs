//! The dashboard controller.
//!
//! A single owner of all tab state consumes [`Message`]s one at a time. Fetch
//! workers never touch tabs directly; each sends one completion addressed to
//! its tab index, and key presses arrive on the same queue.

use crossbeam_channel::Sender;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::{ConfigError, FetchError};
use crate::event::Event;
use crate::fetch::{FetchRequest, spawn_fetches};
use crate::layout::LayoutProfile;
use crate::open::UrlOpener;
use crate::source::EventSource;
use crate::tab::{Tab, TabState};
use crate::theme::Theme;

/// Messages consumed by the UI loop.
#[derive(Debug)]
pub enum Message {
    /// The fetch for tab `tab` finished.
    FetchCompleted {
        tab: usize,
        result: Result<Vec<Event>, FetchError>,
    },
    /// A terminal event: key press, resize, ...
    Input(TermEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One account, full screen; fetch failures end the session.
    Single,
    /// One tab per configured account; failures stay on their tab.
    Dashboard,
}

impl Mode {
    pub fn profile(self) -> LayoutProfile {
        match self {
            Mode::Single => LayoutProfile::SINGLE,
            Mode::Dashboard => LayoutProfile::DASHBOARD,
        }
    }
}

/// Collaborators handed to the controller at construction.
pub struct DashboardContext {
    pub theme: Theme,
    pub opener: Box<dyn UrlOpener>,
}

impl DashboardContext {
    pub fn new(theme: Theme, opener: Box<dyn UrlOpener>) -> Self {
        Self { theme, opener }
    }
}

pub struct Dashboard {
    tabs: Vec<Tab>,
    active: usize,
    mode: Mode,
    width: Option<u16>,
    context: DashboardContext,
    should_quit: bool,
}

impl Dashboard {
    /// Build one `Loading` tab per request. Fails when there are none.
    pub fn new(
        requests: Vec<FetchRequest>,
        mode: Mode,
        context: DashboardContext,
        width: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if requests.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        Ok(Self {
            tabs: requests.into_iter().map(Tab::new).collect(),
            active: 0,
            mode,
            width,
            context,
            should_quit: false,
        })
    }

    /// Dispatch one concurrent fetch per tab.
    pub fn start(&self, source: Arc<dyn EventSource>, clock: Arc<dyn Clock>, sender: Sender<Message>) {
        info!("Dispatching {} fetch(es)", self.tabs.len());
        let requests = self.tabs.iter().map(|tab| tab.request.clone()).collect();
        spawn_fetches(requests, source, clock, sender);
    }

    pub fn handle(&mut self, message: Message) -> Flow {
        if self.should_quit {
            return Flow::Quit;
        }

        let flow = match message {
            Message::FetchCompleted { tab, result } => self.on_fetch_completed(tab, result),
            Message::Input(TermEvent::Key(key)) => self.on_key(key),
            Message::Input(TermEvent::Resize(width, _)) => {
                self.on_resize(width);
                Flow::Continue
            }
            Message::Input(_) => Flow::Continue,
        };

        if flow == Flow::Quit {
            self.should_quit = true;
        }
        flow
    }

    fn on_fetch_completed(&mut self, index: usize, result: Result<Vec<Event>, FetchError>) -> Flow {
        let mode = self.mode;
        let width = self.width;
        let Some(tab) = self.tabs.get_mut(index) else {
            debug!("Ignoring completion for unknown tab {}", index);
            return Flow::Continue;
        };

        let applied = tab.complete(result, width, mode.profile(), mode == Mode::Dashboard);
        if !applied {
            return Flow::Continue;
        }
        info!("{}: {}", tab.login(), tab.state.label());

        if mode == Mode::Single && tab.error().is_some() {
            return Flow::Quit;
        }
        Flow::Continue
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Char('q') => {
                info!("Quit requested by user");
                return Flow::Quit;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                info!("Ctrl+C pressed, quitting");
                return Flow::Quit;
            }
            _ => {}
        }

        if self.mode == Mode::Dashboard {
            match key.code {
                KeyCode::Left | KeyCode::Char('j') => {
                    self.select_previous_tab();
                    return Flow::Continue;
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.select_next_tab();
                    return Flow::Continue;
                }
                _ => {}
            }
        }

        if key.code == KeyCode::Enter {
            self.activate_selection();
            return Flow::Continue;
        }

        let active = self.tabs.get_mut(self.active).map(|tab| &mut tab.state);
        if let Some(TabState::Loaded { table, .. }) = active {
            table.handle_key(key);
        }
        Flow::Continue
    }

    fn on_resize(&mut self, width: u16) {
        debug!("Terminal resized to {} columns", width);
        self.width = Some(width);
        self.relayout_active();
    }

    pub fn select_previous_tab(&mut self) {
        if self.active > 0 {
            self.active -= 1;
            self.relayout_active();
        }
    }

    pub fn select_next_tab(&mut self) {
        if self.active + 1 < self.tabs.len() {
            self.active += 1;
            self.relayout_active();
        }
    }

    // A tab laid out before the last resize catches up when it becomes active.
    fn relayout_active(&mut self) {
        let width = self.width;
        if let Some(tab) = self.tabs.get_mut(self.active) {
            tab.relayout(width);
        }
    }

    fn activate_selection(&self) {
        let Some(event) = self.active_tab().and_then(Tab::selected_event) else {
            return;
        };
        let Some(url) = event.repo_html_url() else {
            warn!("Invalid repository name for URL: {:?}", event.repo.name);
            return;
        };
        info!("Opening {}", url);
        if let Err(err) = self.context.opener.open(&url) {
            error!("Failed to open URL {}: {}", url, err);
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut [Tab] {
        &mut self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn width(&self) -> Option<u16> {
        self.width
    }

    pub fn theme(&self) -> &Theme {
        &self.context.theme
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The error that ended a single-account session, if any.
    pub fn failure(&self) -> Option<&FetchError> {
        match self.mode {
            Mode::Single => self.tabs.iter().find_map(Tab::error),
            Mode::Dashboard => None,
        }
    }
}
