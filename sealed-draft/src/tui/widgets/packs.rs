// Pack overview widget: cards left in each pack of the current round.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::draft::pack::PACK_SIZE;
use crate::tui::ViewState;

/// Render one gauge line per pack, the active pack marked.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Packs");

    let Some((draft, round)) = state
        .draft
        .as_deref()
        .and_then(|d| Some((d, d.current_round()?)))
    else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };
    let active = (!draft.is_complete).then(|| draft.active_index());

    let lines: Vec<Line> = round
        .packs
        .iter()
        .enumerate()
        .map(|(i, pack)| {
            let is_active = active == Some(i);
            let style = if is_active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if pack.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(if is_active { "> " } else { "  " }, style),
                Span::styled(format!("Pack {} ", i + 1), style),
                Span::styled(pack_gauge(pack.len()), style),
                Span::styled(format!(" {:>2}", pack.len()), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Filled and empty blocks for `remaining` out of a full pack.
pub fn pack_gauge(remaining: usize) -> String {
    let filled = remaining.min(PACK_SIZE);
    format!("{}{}", "█".repeat(filled), "░".repeat(PACK_SIZE - filled))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
