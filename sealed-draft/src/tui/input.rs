// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the session,
// or into local ViewState changes (selection, command typing, help overlay).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::{parse_command, UserCommand};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should go to the session.
/// Returns `None` when it only changed the view.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports Release events too.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Any key closes the help overlay.
    if view_state.show_help {
        view_state.show_help = false;
        return None;
    }

    if view_state.command_mode {
        return handle_command_mode(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let last = view_state.active_pack_len().saturating_sub(1);
            view_state.selected = (view_state.selected + 1).min(last);
            None
        }
        KeyCode::Home => {
            view_state.selected = 0;
            None
        }
        KeyCode::End => {
            view_state.selected = view_state.active_pack_len().saturating_sub(1);
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            (view_state.active_pack_len() > 0).then_some(UserCommand::Pick(view_state.selected))
        }
        KeyCode::Char('u') => Some(UserCommand::Undo),
        KeyCode::Char('t') => Some(UserCommand::Tally),
        KeyCode::Char('s') => Some(UserCommand::Status),
        KeyCode::Char(':') => {
            view_state.command_mode = true;
            view_state.command_text.clear();
            None
        }
        KeyCode::Char('?') => {
            view_state.show_help = true;
            None
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Keys while a `:` command is being typed.
///
/// Enter parses the text; a parse error is shown in the message panel and
/// nothing is sent. Esc drops the text.
fn handle_command_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.command_mode = false;
            view_state.command_text.clear();
            None
        }
        KeyCode::Enter => {
            view_state.command_mode = false;
            let text = std::mem::take(&mut view_state.command_text);
            match parse_command(&text) {
                Ok(UserCommand::Help) => {
                    view_state.show_help = true;
                    None
                }
                Ok(command) => Some(command),
                Err(e) => {
                    view_state.message = e.to_string();
                    None
                }
            }
        }
        KeyCode::Backspace => {
            if view_state.command_text.pop().is_none() {
                view_state.command_mode = false;
            }
            None
        }
        KeyCode::Char(c) => {
            view_state.command_text.push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
