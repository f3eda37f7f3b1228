use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

use crate::dashboard::Mode;
use crate::event::Event;
use crate::layout::{LayoutProfile, TableLayout, compute_layout};

/// Interactive state of one tab's table: layout plus cursor.
#[derive(Debug, Clone)]
pub struct EventTable {
    layout: TableLayout,
    profile: LayoutProfile,
    state: TableState,
    len: usize,
}

impl EventTable {
    pub fn new(width: Option<u16>, rows: &[Event], profile: LayoutProfile) -> Self {
        let selected = if rows.is_empty() { None } else { Some(0) };
        Self {
            layout: compute_layout(width, rows, profile),
            profile,
            state: TableState::default().with_selected(selected),
            len: rows.len(),
        }
    }

    /// Recompute column widths after a resize; the cursor is kept.
    pub fn relayout(&mut self, width: Option<u16>, rows: &[Event]) {
        self.layout = compute_layout(width, rows, self.profile);
        self.len = rows.len();
        if let Some(selected) = self.state.selected() {
            if selected >= self.len {
                self.state.select(self.len.checked_sub(1));
            }
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.len)
    }

    pub fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(self.len - 1);
        self.state.select(Some(target));
    }

    pub fn select_first(&mut self) {
        if self.len > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if self.len > 0 {
            self.state.select(Some(self.len - 1));
        }
    }

    /// Apply a navigation key. Returns `false` when the key is not a table key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let page = self.layout.page_size() as isize;
        let half = (page / 2).max(1);

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp | KeyCode::Char('b') => self.move_by(-page),
            KeyCode::PageDown | KeyCode::Char('f') => self.move_by(page),
            KeyCode::Char(' ') if key.modifiers.is_empty() => self.move_by(page),
            KeyCode::Char('u') => self.move_by(-half),
            KeyCode::Char('d') => self.move_by(half),
            KeyCode::Home | KeyCode::Char('g') => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            _ => return false,
        }
        true
    }
}

/// Key hints shown under the table. In dashboard mode `j` belongs to tab
/// navigation, so only the arrow moves down.
pub fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Single => "↑/k up • ↓/j down • b/f page • g/G top/bottom • enter open • q quit",
        Mode::Dashboard => {
            "↑/k up • ↓ down • ←/j →/l tabs • b/f page • g/G top/bottom • enter open • q quit"
        }
    }
}
