// Tally widget: picks grouped by name, in export order.

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use crate::draft::tally::{tally, TallyEntry};
use crate::tui::widgets::ink_color;
use crate::tui::ViewState;

/// Render the running tally into the given area.
///
/// Entries that do not fit are cut off and a scrollbar shows how much is
/// hidden; the full list is one `:tally` away.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let picks = state.draft.as_deref().map_or(&[][..], |d| &d.picks[..]);
    let entries = tally(picks);

    if entries.is_empty() {
        let paragraph = Paragraph::new("  No picks yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Tally"));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2);
    let items: Vec<ListItem> = entries
        .iter()
        .take(visible_rows.max(1))
        .map(|entry| ListItem::new(entry_line(entry)))
        .collect();

    let title = format!("Tally ({} picks, {} names)", picks.len(), entries.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);

    if entries.len() > visible_rows {
        let mut scrollbar_state = ScrollbarState::new(entries.len() - visible_rows);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );
    }
}

/// "count  name" with the name in its ink color.
pub fn entry_line(entry: &TallyEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>3}  ", entry.count), Style::default().fg(Color::White)),
        Span::styled(
            entry.full_name.clone(),
            Style::default().fg(ink_color(entry.color)),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::test_draft;
    use crate::tui::widgets::buffer_text;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn entry_line_pads_the_count() {
        let entry = TallyEntry {
            count: 2,
            full_name: "Card 07".into(),
            color: crate::draft::card::Color::Ruby,
        };
        let line = entry_line(&entry);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "  2  Card 07");
        assert_eq!(line.spans[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn render_does_not_panic_empty() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No picks yet."));
    }

    #[test]
    fn render_shows_counts_and_overflows_with_a_scrollbar() {
        let mut draft = test_draft();
        for _ in 0..30 {
            draft = draft.pick(0).unwrap();
        }
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        let state = ViewState {
            draft: Some(Box::new(draft)),
            ..ViewState::default()
        };
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Tally (30 picks"));
    }
}
