// TUI front end: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` mirroring the draft. The session task pushes
// `UiUpdate` messages over an mpsc channel; the TUI applies them to
// `ViewState` and re-renders at ~30 fps. Key presses become `UserCommand`s
// sent back the other way.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::warn;

use crate::draft::state::DraftState;
use crate::protocol::{UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Everything the widgets need to draw a frame.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// The draft as last reported by the session. `None` until the first update.
    pub draft: Option<Box<DraftState>>,
    /// Result text of the last command.
    pub message: String,
    /// Highlighted card in the active pack (0-based).
    pub selected: usize,
    /// True while a `:` command is being typed.
    pub command_mode: bool,
    /// Text typed after `:`.
    pub command_text: String,
    /// Help overlay visible.
    pub show_help: bool,
    /// How many log entries the draft log keeps on screen.
    pub log_tail: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            draft: None,
            message: String::new(),
            selected: 0,
            command_mode: false,
            command_text: String::new(),
            show_help: false,
            log_tail: 8,
        }
    }
}

impl ViewState {
    /// Number of cards in the active pack, 0 when there is nothing to pick.
    pub fn active_pack_len(&self) -> usize {
        self.draft
            .as_deref()
            .filter(|d| !d.is_complete)
            .and_then(|d| d.active_pack())
            .map_or(0, |p| p.len())
    }
}

/// Apply a single update from the session to the view.
///
/// The selection goes back to the top whenever the draft moves to another
/// turn, and is clamped to the active pack otherwise.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Draft(draft) => {
            let moved = state
                .draft
                .as_deref()
                .map_or(true, |old| (old.round, old.turn) != (draft.round, draft.turn));
            state.draft = Some(draft);
            let len = state.active_pack_len();
            state.selected = if moved {
                0
            } else {
                state.selected.min(len.saturating_sub(1))
            };
        }
        UiUpdate::Message(message) => {
            state.message = message;
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw every panel, then the help overlay when it is open.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::pack::render(frame, layout.pack, state);
    widgets::packs::render(frame, layout.packs, state);
    widgets::tally::render(frame, layout.tally, state);
    widgets::draft_log::render(frame, layout.draft_log, state);
    widgets::command_line::render_message(frame, layout.message, state);
    widgets::command_line::render_input(frame, layout.command_line, state);
    widgets::help::render_bar(frame, layout.help_bar);

    if state.show_help {
        widgets::help::render_overlay(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the session hangs up.
///
/// Takes over the terminal for the duration and restores it on exit, also
/// when a panic unwinds through here.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    log_tail: usize,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the default panic output
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    // 3. View state
    let mut view_state = ViewState {
        log_tail,
        ..ViewState::default()
    };

    // 4. Async keyboard input
    let mut event_stream = EventStream::new();

    // 5. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 6. Main loop
    let outcome = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Session has shut down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let Some(command) = input::handle_key(key_event, &mut view_state) else {
                            continue;
                        };
                        let quit = command == UserCommand::Quit;
                        if cmd_tx.send(command).await.is_err() || quit {
                            break Ok(());
                        }
                    }
                    // Mouse, resize, focus: the next tick redraws
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Terminal input failed: {}", e);
                        let _ = cmd_tx.send(UserCommand::Quit).await;
                        break Err(e.into());
                    }
                    None => {
                        let _ = cmd_tx.send(UserCommand::Quit).await;
                        break Ok(());
                    }
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(e.into());
                }
            }
        }
    };

    // 7. Restore terminal
    ratatui::restore();

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::card::{Card, Color, Rarity};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    pub(crate) fn test_draft() -> DraftState {
        let pool: Vec<Card> = (0..40)
            .map(|i| Card {
                id: i.to_string(),
                full_name: format!("Card {i:02}"),
                color: Color::ALL[i % 6],
                cost: Some((i % 9) as u8),
                rarity: Some(if i % 7 == 0 { Rarity::Legendary } else { Rarity::Common }),
                image: None,
            })
            .collect();
        DraftState::initialize(pool)
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.draft.is_none());
        assert!(state.message.is_empty());
        assert_eq!(state.selected, 0);
        assert!(!state.command_mode);
        assert!(!state.show_help);
        assert_eq!(state.active_pack_len(), 0);
    }

    #[test]
    fn apply_message_replaces_text() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Message("first".into()));
        apply_ui_update(&mut state, UiUpdate::Message("second".into()));
        assert_eq!(state.message, "second");
    }

    #[test]
    fn apply_draft_keeps_selection_within_the_same_turn() {
        let draft = test_draft();
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(draft.clone())));
        assert_eq!(state.active_pack_len(), 12);

        state.selected = 7;
        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(draft.clone())));
        assert_eq!(state.selected, 7);

        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(draft.pick(7).unwrap())));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn completed_draft_has_nothing_to_pick() {
        let mut draft = test_draft();
        while !draft.is_complete {
            draft = draft.pick(0).unwrap();
        }
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(draft)));
        assert_eq!(state.active_pack_len(), 0);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn render_frame_does_not_panic_before_first_update() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[test]
    fn render_frame_does_not_panic_mid_draft_with_help() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let mut draft = test_draft();
        for _ in 0..5 {
            draft = draft.pick(0).unwrap();
        }
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(draft)));
        apply_ui_update(&mut state, UiUpdate::Message("Picked Card 03.".into()));
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        state.show_help = true;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[test]
    fn render_frame_survives_a_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Draft(Box::new(test_draft())));
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}
