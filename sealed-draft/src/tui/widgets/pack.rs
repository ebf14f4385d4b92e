// Active pack widget: the cards that can be picked this turn.
//
// One row per card, numbered from 1 the way typed `pick` commands count.
// The selected row is highlighted; Enter picks it.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::draft::card::Card;
use crate::draft::pack::PACKS_PER_ROUND;
use crate::tui::widgets::ink_color;
use crate::tui::ViewState;

/// Render the active pack into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(draft) = state.draft.as_deref() else {
        let paragraph = Paragraph::new("")
            .block(Block::default().borders(Borders::ALL).title("Pack"));
        frame.render_widget(paragraph, area);
        return;
    };

    if draft.is_complete {
        let paragraph = Paragraph::new("  Draft complete. Export the tally with :export <file>")
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL).title("Pack"));
        frame.render_widget(paragraph, area);
        return;
    }

    let title = format!("Pack {} of {}", draft.active_index() + 1, PACKS_PER_ROUND);
    let cards = draft.active_pack().map_or(&[][..], |p| &p.cards[..]);

    if cards.is_empty() {
        let paragraph = Paragraph::new("  This pack is empty. Undo or reset the round.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(card_line(card), Style::default().fg(ink_color(card.color))),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{title} ({} cards)", cards.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.selected.min(cards.len() - 1)));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// One-line description of a card: name, color, cost, rarity.
pub fn card_line(card: &Card) -> String {
    let mut details = vec![card.color.to_string()];
    if let Some(cost) = card.cost {
        details.push(format!("cost {cost}"));
    }
    if let Some(rarity) = card.rarity {
        details.push(rarity.to_string());
    }
    format!("{} ({})", card.full_name, details.join(", "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
