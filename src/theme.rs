use ratatui::style::{Color, Modifier, Style};

/// Styles used by the renderer. Passed in with the dashboard context rather
/// than living in globals.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub border: Style,
    pub header: Style,
    pub selected: Style,
    pub active_tab: Style,
    pub inactive_tab: Style,
    pub message: Style,
    pub error: Style,
    pub help: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::Indexed(240)),
            header: Style::default()
                .fg(Color::Indexed(63))
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Indexed(229))
                .bg(Color::Indexed(57)),
            active_tab: Style::default()
                .fg(Color::Indexed(229))
                .bg(Color::Indexed(57))
                .add_modifier(Modifier::BOLD),
            inactive_tab: Style::default().fg(Color::Indexed(245)),
            message: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Indexed(204)),
            help: Style::default().fg(Color::Indexed(241)),
        }
    }
}

impl Theme {
    /// No colors at all, for `NO_COLOR` terminals.
    pub fn plain() -> Self {
        Self {
            border: Style::default(),
            header: Style::default().add_modifier(Modifier::BOLD),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            active_tab: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            inactive_tab: Style::default(),
            message: Style::default(),
            error: Style::default().add_modifier(Modifier::BOLD),
            help: Style::default().add_modifier(Modifier::DIM),
        }
    }
}
