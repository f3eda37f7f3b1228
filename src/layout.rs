//! Column widths and visible height for an event table.

use ratatui::text::Line;

use crate::event::Event;

/// Used when the terminal width cannot be determined.
pub const DEFAULT_TERMINAL_WIDTH: u16 = 80;
/// Padding added after the date and repository columns.
pub const COLUMN_SPACING: u16 = 4;
/// Columns kept free on the right edge.
pub const RIGHT_MARGIN: u16 = COLUMN_SPACING * 3;
pub const MIN_DESCRIPTION_WIDTH: u16 = 20;

/// Screen budget for a table. The dashboard gives up width and height to its
/// tab bar; the single-account view does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProfile {
    pub max_height: u16,
    pub reserved_width: u16,
}

impl LayoutProfile {
    pub const SINGLE: LayoutProfile = LayoutProfile {
        max_height: 30,
        reserved_width: 0,
    };

    pub const DASHBOARD: LayoutProfile = LayoutProfile {
        max_height: 25,
        reserved_width: 20,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub date_width: u16,
    pub repo_width: u16,
    pub description_width: u16,
    /// Header row plus data rows, capped at the profile's height.
    pub height: u16,
}

impl TableLayout {
    pub fn widths(&self) -> [u16; 3] {
        [self.date_width, self.repo_width, self.description_width]
    }

    /// Data rows visible at once.
    pub fn page_size(&self) -> usize {
        usize::from(self.height.saturating_sub(1)).max(1)
    }
}

fn display_width(text: &str) -> u16 {
    u16::try_from(Line::from(text).width()).unwrap_or(u16::MAX)
}

/// Compute the layout for `rows` on a terminal `width` columns wide.
///
/// The description column takes whatever is left but never drops below
/// [`MIN_DESCRIPTION_WIDTH`]. Pure: same inputs, same output.
pub fn compute_layout(width: Option<u16>, rows: &[Event], profile: LayoutProfile) -> TableLayout {
    let width = width.filter(|w| *w > 0).unwrap_or(DEFAULT_TERMINAL_WIDTH);

    let max_date = rows.iter().map(|e| display_width(&e.date)).max().unwrap_or(0);
    let max_repo = rows
        .iter()
        .map(|e| display_width(&e.repo.name))
        .max()
        .unwrap_or(0);

    let description_width = width
        .saturating_sub(max_date)
        .saturating_sub(max_repo)
        .saturating_sub(COLUMN_SPACING)
        .saturating_sub(RIGHT_MARGIN)
        .saturating_sub(profile.reserved_width)
        .max(MIN_DESCRIPTION_WIDTH);

    let rows_plus_header = u16::try_from(rows.len()).unwrap_or(u16::MAX).saturating_add(1);

    TableLayout {
        date_width: max_date.saturating_add(COLUMN_SPACING),
        repo_width: max_repo.saturating_add(COLUMN_SPACING),
        description_width,
        height: rows_plus_header.min(profile.max_height),
    }
}
