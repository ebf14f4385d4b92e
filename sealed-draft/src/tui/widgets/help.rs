// Help bar and help overlay.
//
// The bar lists the single-key shortcuts. The overlay adds the typed command
// reference and is closed by any key.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::protocol::HELP_TEXT;

/// Shortcut keys and what they do, in display order.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("↑/↓", "select"),
    ("Enter", "pick"),
    ("u", "undo"),
    ("t", "tally"),
    (":", "command"),
    ("?", "help"),
    ("q", "quit"),
];

const OVERLAY_WIDTH: u16 = 78;
const OVERLAY_HEIGHT: u16 = 16;

/// Render the one-row shortcut bar.
pub fn render_bar(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (key, action) in SHORTCUTS {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(" {action} "), Style::default().fg(Color::Gray)));
    }
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay centered on `area`.
pub fn render_overlay(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(OVERLAY_WIDTH, OVERLAY_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Help (any key closes) ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(HELP_TEXT)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// A rectangle of the given size centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_text;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn overlay_fits_the_command_reference() {
        let longest = HELP_TEXT.lines().map(|l| l.chars().count()).max().unwrap();
        assert!(longest as u16 + 2 <= OVERLAY_WIDTH);
        assert!(HELP_TEXT.lines().count() as u16 + 2 <= OVERLAY_HEIGHT);
    }

    #[test]
    fn centered_rect_is_centered_and_clamped() {
        let rect = centered_rect(20, 4, Rect::new(0, 0, 80, 24));
        assert_eq!((rect.width, rect.height), (20, 4));
        assert_eq!(rect.x, 30);
        assert_eq!(rect.y, 10);

        let small = Rect::new(0, 0, 10, 3);
        let rect = centered_rect(OVERLAY_WIDTH, OVERLAY_HEIGHT, small);
        assert_eq!((rect.width, rect.height), (10, 3));
    }

    #[test]
    fn bar_lists_every_shortcut() {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal.draw(|frame| render_bar(frame, frame.area())).unwrap();
        let text = buffer_text(&terminal);
        for (_, action) in SHORTCUTS {
            assert!(text.contains(action), "missing {action}");
        }
    }

    #[test]
    fn overlay_shows_typed_commands() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render_overlay(frame, frame.area()))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("reset-round"));
        assert!(text.contains("import <file>"));
    }
}
