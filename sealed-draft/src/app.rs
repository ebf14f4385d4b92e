// Session orchestration.
//
// Owns the current DraftState, applies user commands to it, hands every new
// state (and draft id) to the background Persister, and reports results to
// the UI. The session is the single writer; commands run one at a time.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::draft::card::Card;
use crate::draft::pack::PACKS_PER_ROUND;
use crate::draft::state::{DraftError, DraftState, ROUNDS_PER_DRAFT, TURNS_PER_ROUND};
use crate::draft::tally::{format_canonical, parse_export, resolve_import, tally};
use crate::persist::Persister;
use crate::protocol::{UiUpdate, UserCommand, HELP_TEXT};

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Show this text and keep reading commands.
    Continue(String),
    /// Leave the command loop.
    Quit,
}

/// The complete application state.
pub struct Session {
    pub draft_state: DraftState,
    /// Identifies the current draft in the export history.
    pub draft_id: String,
    /// True when the draft was resumed from the database.
    pub restored: bool,
    pool: Arc<[Card]>,
    db: Arc<Database>,
    persister: Persister,
}

impl Session {
    /// Open a session over `pool`, resuming the saved draft when there is a
    /// compatible one and starting a fresh draft otherwise.
    ///
    /// Must be called inside a tokio runtime (the Persister spawns a task).
    pub fn open(pool: Vec<Card>, db: Arc<Database>) -> Self {
        let pool: Arc<[Card]> = pool.into();
        let persister = Persister::spawn(db.clone());

        let mut session = Self {
            draft_state: DraftState::initialize(Arc::clone(&pool)),
            draft_id: Database::generate_draft_id(),
            restored: false,
            pool,
            db,
            persister,
        };

        session.restored = session.recover_from_db();
        if !session.restored {
            session.remember_draft_id();
            session.persister.save(&session.draft_state);
        }
        session
    }

    /// The card pool this session drafts from.
    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    /// Replace the fresh draft with a saved one, if a compatible one exists.
    ///
    /// A saved draft is only restored when it was drawn from the same card
    /// pool. Load failures are logged and the fresh draft is kept.
    fn recover_from_db(&mut self) -> bool {
        let saved = match self.db.load_draft() {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                info!("No saved draft found, starting fresh");
                return false;
            }
            Err(e) => {
                warn!("Could not load saved draft, starting fresh: {:#}", e);
                return false;
            }
        };

        if saved.pool[..] != self.pool[..] {
            warn!("Saved draft was drawn from a different card pool; discarding it");
            if let Err(e) = self.db.clear_draft() {
                warn!("Could not discard saved draft: {:#}", e);
            }
            return false;
        }

        match self.db.get_draft_id() {
            Ok(Some(id)) => self.draft_id = id,
            Ok(None) => self.remember_draft_id(),
            Err(e) => warn!("Could not load draft id: {:#}", e),
        }

        info!(
            "Restored draft {}: round {}, turn {}, {} picks",
            self.draft_id,
            saved.round,
            saved.turn,
            saved.picks.len()
        );
        // Share the session's pool instead of the copy read from the database.
        self.draft_state = DraftState {
            pool: Arc::clone(&self.pool),
            ..saved
        };
        true
    }

    /// Apply one command and describe the result.
    pub fn handle_command(&mut self, command: UserCommand) -> CommandOutcome {
        let text = match command {
            UserCommand::Pick(index) => self.pick(index),
            UserCommand::Undo => match self.draft_state.undo() {
                Ok(previous) => {
                    self.commit(previous);
                    "Last pick undone.".to_string()
                }
                Err(DraftError::NoUndoAvailable) => "Nothing to undo.".to_string(),
                Err(e) => e.to_string(),
            },
            UserCommand::ResetRound => {
                let next = self.draft_state.reset_round();
                let round = next.round;
                self.commit(next);
                format!("Round {round} redrawn.")
            }
            UserCommand::ResetDraft => {
                self.commit(DraftState::reset_draft(Arc::clone(&self.pool)));
                self.draft_id = Database::generate_draft_id();
                self.remember_draft_id();
                info!("New draft started: {}", self.draft_id);
                "New draft started.".to_string()
            }
            UserCommand::Status => status_line(&self.draft_state),
            UserCommand::Tally => match format_canonical(&tally(&self.draft_state.picks)) {
                text if text.is_empty() => "No picks yet.".to_string(),
                text => text,
            },
            UserCommand::Export(path) => self.export(path.as_deref()),
            UserCommand::Import(path) => self.import(&path),
            UserCommand::Help => HELP_TEXT.to_string(),
            UserCommand::Quit => return CommandOutcome::Quit,
        };
        CommandOutcome::Continue(text)
    }

    /// Flush pending writes. Call once before exiting.
    pub async fn shutdown(self) {
        self.persister.shutdown().await;
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    fn pick(&mut self, index: usize) -> String {
        match self.draft_state.pick(index) {
            Ok(next) => {
                let picked = next
                    .picks
                    .last()
                    .map(|c| c.full_name.clone())
                    .unwrap_or_default();
                let complete = next.is_complete;
                self.commit(next);
                if complete {
                    info!("Draft {} complete", self.draft_id);
                    format!(
                        "Picked {picked}. Draft complete! {} cards picked; `export <file>` saves the tally.",
                        self.draft_state.picks.len()
                    )
                } else {
                    format!("Picked {picked}.")
                }
            }
            Err(e) => {
                warn!("Rejected pick: {}", e);
                format!("Cannot pick card {}: {}", index + 1, e)
            }
        }
    }

    fn export(&self, path: Option<&Path>) -> String {
        let text = format_canonical(&tally(&self.draft_state.picks));
        if let Err(e) = self.db.record_export(&self.draft_id, &text) {
            warn!("Failed to record export: {:#}", e);
        }
        match path {
            Some(path) => match std::fs::write(path, format!("{text}\n")) {
                Ok(()) => {
                    info!("Exported tally to {}", path.display());
                    format!("Tally written to {}.", path.display())
                }
                Err(e) => format!("Could not write {}: {}", path.display(), e),
            },
            None => text,
        }
    }

    fn import(&self, path: &Path) -> String {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return format!("Could not read {}: {}", path.display(), e),
        };
        let entries = match parse_export(&text) {
            Ok(entries) => entries,
            Err(e) => return format!("Could not import {}: {}", path.display(), e),
        };
        let (cards, unknown) = resolve_import(&entries, &self.pool);
        info!(
            "Imported {} line(s) from {}: {} card(s), {} unknown",
            entries.len(),
            path.display(),
            cards.len(),
            unknown.len()
        );

        let mut out = format!(
            "Imported {} card(s) from {}:\n{}",
            cards.len(),
            path.display(),
            format_canonical(&tally(&cards))
        );
        if !unknown.is_empty() {
            out.push_str(&format!("\nNot in the card pool: {}", unknown.join(", ")));
        }
        out
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Swap in a new state and queue it for saving.
    fn commit(&mut self, next: DraftState) {
        self.draft_state = next;
        self.persister.save(&self.draft_state);
    }

    fn remember_draft_id(&self) {
        self.persister.set_draft_id(&self.draft_id);
    }
}

/// One-line draft position, e.g. `Round 2/6, turn 5/12, pack 5 of 6, 17 picks.`
pub fn status_line(state: &DraftState) -> String {
    if state.is_complete {
        return format!(
            "Draft complete: {} picks over {} rounds.",
            state.picks.len(),
            ROUNDS_PER_DRAFT
        );
    }
    format!(
        "Round {}/{}, turn {}/{}, pack {} of {}, {} picks.",
        state.round,
        ROUNDS_PER_DRAFT,
        state.turn,
        TURNS_PER_ROUND,
        state.active_index() + 1,
        PACKS_PER_ROUND,
        state.picks.len()
    )
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Drive `session` from UI commands until quit or until either channel closes,
/// then flush pending writes.
///
/// After every command the UI gets the result text followed by the new draft.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut session: Session,
) {
    let greeting = format!(
        "{} cards in the pool{}. Press ? for help.",
        session.pool().len(),
        if session.restored { ", previous draft resumed" } else { "" }
    );
    let opened = ui_tx.send(UiUpdate::Message(greeting)).await.is_ok()
        && ui_tx.send(draft_update(&session)).await.is_ok();

    if opened {
        while let Some(command) = cmd_rx.recv().await {
            debug!("Command: {:?}", command);
            let text = match session.handle_command(command) {
                CommandOutcome::Continue(text) => text,
                CommandOutcome::Quit => break,
            };
            if ui_tx.send(UiUpdate::Message(text)).await.is_err()
                || ui_tx.send(draft_update(&session)).await.is_err()
            {
                warn!("UI channel closed; stopping session");
                break;
            }
        }
    }

    session.shutdown().await;
    info!("Session closed");
}

fn draft_update(session: &Session) -> UiUpdate {
    UiUpdate::Draft(Box::new(session.draft_state.clone()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
