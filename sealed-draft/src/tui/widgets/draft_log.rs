// Draft log widget: the most recent picks, newest first.
//
// Each: "R{round} T{turn}  Pack {n}: {card} (-{removed})"

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::draft::state::PickEvent;
use crate::tui::widgets::ink_color;
use crate::tui::ViewState;

/// Render the draft log into the given area.
///
/// Shows at most `log_tail` entries, fewer when the area is shorter.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let log = state.draft.as_deref().map_or(&[][..], |d| &d.log[..]);

    if log.is_empty() {
        let paragraph = Paragraph::new("  No picks yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Draft Log"));
        frame.render_widget(paragraph, area);
        return;
    }

    // Subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2);
    let shown = state.log_tail.min(visible_rows).max(1);

    let items: Vec<ListItem> = log
        .iter()
        .rev()
        .take(shown)
        .map(|event| {
            ListItem::new(Line::from(Span::styled(
                format_event(event),
                Style::default().fg(ink_color(event.card.color)),
            )))
        })
        .collect();

    let title = format!("Draft Log ({})", log.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// Format a single pick event for display.
pub fn format_event(event: &PickEvent) -> String {
    format!(
        "R{} T{:<2} Pack {}: {} (-{})",
        event.round,
        event.turn,
        event.pack_index + 1,
        event.card.full_name,
        event.removed_count
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
