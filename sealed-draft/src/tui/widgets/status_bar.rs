// Status bar widget: draft position and pick counter.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::draft::state::{DraftState, ROUNDS_PER_DRAFT, TURNS_PER_ROUND};
use crate::tui::ViewState;

/// Total picks in a complete draft.
const TOTAL_PICKS: u32 = ROUNDS_PER_DRAFT * TURNS_PER_ROUND;

/// Render the status bar into the given area.
///
/// Layout: [position] | [pick counter] | [undo marker]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let spans = match state.draft.as_deref() {
        None => vec![Span::styled(
            " Loading draft...",
            Style::default().fg(Color::Gray),
        )],
        Some(draft) => {
            let (text, color) = position_text(draft);
            let mut spans = vec![
                Span::styled(
                    format!(" {text}"),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" | ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("Pick {}/{}", draft.picks.len(), TOTAL_PICKS),
                    Style::default().fg(Color::White),
                ),
            ];
            if draft.can_undo() {
                spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
                spans.push(Span::styled("undo ready", Style::default().fg(Color::DarkGray)));
            }
            spans
        }
    };

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Position label and its color, e.g. "Round 2/6  Turn 5/12".
pub fn position_text(draft: &DraftState) -> (String, Color) {
    if draft.is_complete {
        return ("Draft complete".to_string(), Color::Green);
    }
    (
        format!(
            "Round {}/{}  Turn {}/{}",
            draft.round, ROUNDS_PER_DRAFT, draft.turn, TURNS_PER_ROUND
        ),
        Color::Cyan,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
