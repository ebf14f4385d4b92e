// Message panel and `:` command line.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the result of the last command. Long text is wrapped and cut at the
/// bottom of the panel.
pub fn render_message(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(state.message.as_str())
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::TOP).title("Message"));
    frame.render_widget(paragraph, area);
}

/// Render the command line: the typed text with a cursor while in command
/// mode, a dim hint otherwise.
pub fn render_input(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if state.command_mode {
        Line::from(vec![
            Span::styled(":", Style::default().fg(Color::Yellow)),
            Span::raw(state.command_text.as_str()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    } else {
        Line::from(Span::styled(
            "Press : to type a command",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
