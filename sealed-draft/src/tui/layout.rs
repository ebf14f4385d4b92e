// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------+-----------------------+
// | Active Pack (55%)         | Packs (8 rows)        |
// |                           +-----------------------+
// |                           | Tally (fill)          |
// +--------------------------+-----------------------+
// | Draft Log (8 rows)                                |
// +--------------------------------------------------+
// | Message (4 rows)                                  |
// +--------------------------------------------------+
// | Command Line (1 row)                              |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each panel.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: round, turn, pick count.
    pub status_bar: Rect,
    /// Left of the middle section: cards in the active pack.
    pub pack: Rect,
    /// Right column top: cards left in each pack of the round.
    pub packs: Rect,
    /// Right column bottom: picks grouped by name.
    pub tally: Rect,
    /// Most recent pick events.
    pub draft_log: Rect,
    /// Result text of the last command.
    pub message: Rect,
    /// `:` command input.
    pub command_line: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the screen layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // pack + sidebar
            Constraint::Length(8), // draft log
            Constraint::Length(4), // message
            Constraint::Length(1), // command line
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vertical[1]);

    // Six packs plus borders.
    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(horizontal[1]);

    AppLayout {
        status_bar: vertical[0],
        pack: horizontal[0],
        packs: sidebar[0],
        tally: sidebar[1],
        draft_log: vertical[2],
        message: vertical[3],
        command_line: vertical[4],
        help_bar: vertical[5],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
