// Draft state machine: turn rotation, pick-and-remove protocol, round
// transitions, single-slot undo, and resets.
//
// Every transition takes `&self` and returns a fresh DraftState; the value
// passed in is never modified.

use std::fmt;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::card::Card;
use super::pack::{create_round_with, Pack, Round, PACKS_PER_ROUND};

/// Turns in each round. Every pack is active on exactly two of them.
pub const TURNS_PER_ROUND: u32 = 12;

/// Rounds in a full draft.
pub const ROUNDS_PER_DRAFT: u32 = 6;

/// Probability that an idle pack loses a uniformly random card instead of its
/// highest-rarity card.
const UNIFORM_REMOVAL_PROBABILITY: f64 = 0.5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The index does not address a card in the active pack. Also returned
    /// when the draft is complete (`available` is then 0).
    #[error("invalid pick index {index}: active pack holds {available} card(s)")]
    InvalidPickIndex { index: usize, available: usize },

    #[error("nothing to undo")]
    NoUndoAvailable,
}

/// A round ended with cards still left in at least one pack.
///
/// The removal policy should make this unreachable; it is logged and the
/// draft carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundIntegrityWarning {
    pub round: u32,
    pub remaining: Vec<usize>,
}

impl fmt::Display for RoundIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {} ended with cards left in its packs: {:?}",
            self.round, self.remaining
        )
    }
}

/// Inspect a finished round. Returns a warning if any pack still holds cards.
pub fn check_round_integrity(round: &Round) -> Option<RoundIntegrityWarning> {
    if round.is_exhausted() {
        None
    } else {
        Some(RoundIntegrityWarning {
            round: round.number,
            remaining: round.remaining_counts(),
        })
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Immutable record of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickEvent {
    pub round: u32,
    pub turn: u32,
    /// 0-based index of the pack the card was picked from.
    pub pack_index: usize,
    pub card: Card,
    /// Cards stripped from the other packs on this turn.
    pub removed_count: usize,
}

/// The complete state of a sealed draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// Master card pool. Shared between snapshots, never modified.
    pub pool: Arc<[Card]>,
    /// Every round opened so far; the last one is current.
    pub rounds: Vec<Round>,
    /// Current round number (1-based).
    pub round: u32,
    /// Current turn within the round (1-based). Reads 13 once the draft is complete.
    pub turn: u32,
    /// All picked cards across the whole draft, in pick order.
    pub picks: Vec<Card>,
    /// One entry per pick, parallel to `picks`.
    pub log: Vec<PickEvent>,
    pub is_complete: bool,
    /// The state as it was before the most recent pick. Never nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo: Option<Box<DraftState>>,
}

/// 0-based index of the pack picked from on `turn` (1-based).
pub fn active_pack_index(turn: u32) -> usize {
    (turn.saturating_sub(1) as usize) % PACKS_PER_ROUND
}

impl DraftState {
    /// Start a new draft: round 1, turn 1, freshly drawn packs.
    pub fn initialize(pool: impl Into<Arc<[Card]>>) -> Self {
        Self::initialize_with(pool.into(), &mut rand::rng())
    }

    pub(crate) fn initialize_with<R: Rng + ?Sized>(pool: Arc<[Card]>, rng: &mut R) -> Self {
        let first = create_round_with(1, &pool, rng);
        info!("Draft initialized with a pool of {} cards", pool.len());
        DraftState {
            pool,
            rounds: vec![first],
            round: 1,
            turn: 1,
            picks: Vec::new(),
            log: Vec::new(),
            is_complete: false,
            undo: None,
        }
    }

    /// Start over from scratch. Same as [`DraftState::initialize`].
    pub fn reset_draft(pool: impl Into<Arc<[Card]>>) -> Self {
        Self::initialize(pool)
    }

    /// The round currently being drafted (or the final round, once complete).
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Index of the pack the next pick comes from.
    pub fn active_index(&self) -> usize {
        active_pack_index(self.turn)
    }

    /// The pack the next pick comes from.
    pub fn active_pack(&self) -> Option<&Pack> {
        self.current_round()
            .and_then(|r| r.packs.get(self.active_index()))
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Pick the card at `card_index` from the active pack.
    ///
    /// Every other non-empty pack then loses one card, the turn advances, and
    /// the round (or the whole draft) closes after the twelfth turn. On error
    /// nothing changes.
    pub fn pick(&self, card_index: usize) -> Result<DraftState, DraftError> {
        self.pick_with(card_index, &mut rand::rng())
    }

    pub(crate) fn pick_with<R: Rng + ?Sized>(
        &self,
        card_index: usize,
        rng: &mut R,
    ) -> Result<DraftState, DraftError> {
        let available = if self.is_complete {
            0
        } else {
            self.active_pack().map(Pack::len).unwrap_or(0)
        };
        if card_index >= available {
            return Err(DraftError::InvalidPickIndex {
                index: card_index,
                available,
            });
        }

        let mut snapshot = self.clone();
        snapshot.undo = None;

        let mut next = self.clone();
        next.undo = Some(Box::new(snapshot));

        let active = self.active_index();
        let (picked, removed_count) = {
            let round = next
                .rounds
                .last_mut()
                .ok_or(DraftError::InvalidPickIndex {
                    index: card_index,
                    available: 0,
                })?;

            let picked = round.packs[active]
                .take(card_index)
                .ok_or(DraftError::InvalidPickIndex {
                    index: card_index,
                    available,
                })?;

            let mut removed_count = 0;
            for (i, pack) in round.packs.iter_mut().enumerate() {
                if i == active {
                    continue;
                }
                if let Some(victim) = removal_index(pack, rng) {
                    pack.cards.remove(victim);
                    removed_count += 1;
                }
            }
            (picked, removed_count)
        };

        debug!(
            "Round {} turn {}: picked '{}' from pack {}, removed {} from idle packs",
            self.round, self.turn, picked.full_name, active, removed_count
        );

        next.picks.push(picked.clone());
        next.log.push(PickEvent {
            round: self.round,
            turn: self.turn,
            pack_index: active,
            card: picked,
            removed_count,
        });

        next.turn += 1;
        if next.turn > TURNS_PER_ROUND {
            next.close_round(rng);
        }

        Ok(next)
    }

    /// Finish the current round: verify it emptied, then open the next round
    /// or mark the draft complete.
    fn close_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(warning) = self.current_round().and_then(check_round_integrity) {
            warn!("Round integrity warning: {}", warning);
        }

        if self.round < ROUNDS_PER_DRAFT {
            self.round += 1;
            self.turn = 1;
            let round = create_round_with(self.round, &self.pool, rng);
            self.rounds.push(round);
            info!("Round {} started", self.round);
        } else {
            self.is_complete = true;
            info!("Draft complete with {} picks", self.picks.len());
        }
    }

    /// Return to the state before the most recent pick.
    ///
    /// The restored state has no undo buffer of its own, so undos cannot be
    /// chained.
    pub fn undo(&self) -> Result<DraftState, DraftError> {
        let mut restored = self
            .undo
            .as_deref()
            .cloned()
            .ok_or(DraftError::NoUndoAvailable)?;
        restored.undo = None;
        Ok(restored)
    }

    /// Throw away the current round's picks and redraw its packs.
    ///
    /// Picks and log entries from earlier rounds are kept. The undo buffer is
    /// cleared. Resetting a completed draft reopens its final round.
    pub fn reset_round(&self) -> DraftState {
        self.reset_round_with(&mut rand::rng())
    }

    pub(crate) fn reset_round_with<R: Rng + ?Sized>(&self, rng: &mut R) -> DraftState {
        let cut = self
            .log
            .iter()
            .position(|e| e.round == self.round)
            .unwrap_or(self.log.len());

        let mut next = self.clone();
        next.undo = None;
        next.log.truncate(cut);
        next.picks.truncate(cut);
        next.turn = 1;
        next.is_complete = false;

        let fresh = create_round_with(self.round, &self.pool, rng);
        match next.rounds.last_mut() {
            Some(current) if current.number == self.round => *current = fresh,
            _ => next.rounds.push(fresh),
        }

        info!(
            "Round {} reset: discarded {} pick(s)",
            self.round,
            self.log.len() - cut
        );
        next
    }
}

// ---------------------------------------------------------------------------
// Removal policy
// ---------------------------------------------------------------------------

/// Choose which card an idle pack loses this turn. `None` for an empty pack.
///
/// Half the time a uniformly random card goes; otherwise a card of the
/// highest rarity rank present, ties broken at random.
fn removal_index<R: Rng + ?Sized>(pack: &Pack, rng: &mut R) -> Option<usize> {
    if pack.is_empty() {
        return None;
    }
    if rng.random_bool(UNIFORM_REMOVAL_PROBABILITY) {
        Some(rng.random_range(0..pack.len()))
    } else {
        highest_rarity_index(pack, rng)
    }
}

fn highest_rarity_index<R: Rng + ?Sized>(pack: &Pack, rng: &mut R) -> Option<usize> {
    let top = pack.cards.iter().map(Card::rarity_rank).max()?;
    let candidates: Vec<usize> = pack
        .cards
        .iter()
        .enumerate()
        .filter(|(_, c)| c.rarity_rank() == top)
        .map(|(i, _)| i)
        .collect();
    candidates.choose(rng).copied()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
