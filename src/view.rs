use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Paragraph, Row, Table, Tabs},
};

use crate::dashboard::{Dashboard, Mode};
use crate::event::Event;
use crate::tab::{Tab, TabState};
use crate::table::{EventTable, help_text};
use crate::theme::Theme;

const COLUMN_TITLES: [&str; 3] = ["Date", "Repository", "Description"];

/// Render the whole screen for the current dashboard state.
pub fn render(frame: &mut Frame, dashboard: &mut Dashboard) {
    let theme = dashboard.theme().clone();
    let area = frame.area();

    let content = match dashboard.mode() {
        Mode::Single => area,
        Mode::Dashboard => {
            let chunks = Layout::vertical([
                Constraint::Length(1), // Tab bar
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);
            render_tab_bar(frame, chunks[0], dashboard, &theme);
            chunks[2]
        }
    };

    let mode = dashboard.mode();
    let active = dashboard.active_index();
    match dashboard.tabs_mut().get_mut(active) {
        Some(tab) => render_tab(frame, content, tab, mode, &theme),
        None => frame.render_widget(Paragraph::new("No active tab").style(theme.message), content),
    }
}

fn tab_title(tab: &Tab) -> String {
    match tab.state {
        TabState::Loading => format!("{} (loading...)", tab.login()),
        TabState::Error(_) => format!("{} (error)", tab.login()),
        TabState::Loaded { .. } => tab.login().to_string(),
    }
}

fn render_tab_bar(frame: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let titles: Vec<String> = dashboard.tabs().iter().map(tab_title).collect();
    let tabs = Tabs::new(titles)
        .select(dashboard.active_index())
        .style(theme.inactive_tab)
        .highlight_style(theme.active_tab)
        .divider(" ");
    frame.render_widget(tabs, area);
}

fn render_tab(frame: &mut Frame, area: Rect, tab: &mut Tab, mode: Mode, theme: &Theme) {
    let login = tab.login().to_string();
    match &mut tab.state {
        TabState::Loading => {
            let text = match mode {
                Mode::Single => "Loading events...".to_string(),
                Mode::Dashboard => format!("Loading events for {}...", login),
            };
            frame.render_widget(Paragraph::new(text).style(theme.message), area);
        }
        TabState::Error(err) => {
            let text = format!("Error loading events for {}: {}", login, err);
            frame.render_widget(Paragraph::new(text).style(theme.error), area);
        }
        TabState::Loaded { events, .. } if events.is_empty() => {
            let text = format!("No events found for {}", login);
            frame.render_widget(Paragraph::new(text).style(theme.message), area);
        }
        TabState::Loaded { events, table } => render_table(frame, area, events, table, mode, theme),
    }
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    events: &[Event],
    table: &mut EventTable,
    mode: Mode,
    theme: &Theme,
) {
    let layout = *table.layout();
    let widths = layout.widths();

    let chunks = Layout::vertical([
        Constraint::Length(layout.height.saturating_add(2)), // Table plus border
        Constraint::Length(1),                               // Help
        Constraint::Min(0),
    ])
    .split(area);

    let table_width = widths
        .iter()
        .fold(2u16, |acc, w| acc.saturating_add(*w))
        .min(chunks[0].width);
    let table_area = Rect {
        width: table_width,
        ..chunks[0]
    };

    let header = Row::new(COLUMN_TITLES).style(theme.header);
    let rows = events.iter().map(|event| {
        Row::new(vec![
            event.date.clone(),
            event.repo.name.clone(),
            event.description.clone(),
        ])
    });

    let widget = Table::new(rows, widths.map(Constraint::Length))
        .header(header)
        .column_spacing(0)
        .block(Block::bordered().border_style(theme.border))
        .row_highlight_style(theme.selected);
    frame.render_stateful_widget(widget, table_area, table.state_mut());

    let help = Paragraph::new(Line::from(format!("  {}", help_text(mode)))).style(theme.help);
    frame.render_widget(help, chunks[1]);
}
