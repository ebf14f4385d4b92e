// Pack and round construction from the master card pool.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::card::Card;

/// Cards in a freshly drawn pack.
pub const PACK_SIZE: usize = 12;

/// Packs opened each round. Also the period of the active-pack rotation.
pub const PACKS_PER_ROUND: usize = 6;

/// An ordered collection of cards still available in one pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    /// Unique within a draft: round 1 holds packs 1..=6, round 2 holds 7..=12, ...
    pub id: u32,
    pub cards: Vec<Card>,
}

impl Pack {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remove and return the card at `index`, if it exists.
    pub fn take(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }
}

/// One cycle of six packs. Completed rounds are kept for history only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub packs: Vec<Pack>,
}

impl Round {
    /// Remaining card count per pack, in pack order.
    pub fn remaining_counts(&self) -> Vec<usize> {
        self.packs.iter().map(Pack::len).collect()
    }

    /// True when every pack has been emptied.
    pub fn is_exhausted(&self) -> bool {
        self.packs.iter().all(Pack::is_empty)
    }
}

/// Draw a pack of up to `size` distinct pool entries.
///
/// Entries are sampled without replacement for this single draw. A pool with
/// fewer than `size` entries yields a short pack holding the whole pool in
/// shuffled order; the draft still runs, but its packs empty early.
pub fn create_pack(id: u32, pool: &[Card], size: usize) -> Pack {
    create_pack_with(id, pool, size, &mut rand::rng())
}

pub(crate) fn create_pack_with<R: Rng + ?Sized>(
    id: u32,
    pool: &[Card],
    size: usize,
    rng: &mut R,
) -> Pack {
    let cards = if pool.len() <= size {
        let mut all = pool.to_vec();
        all.shuffle(rng);
        all
    } else {
        pool.choose_multiple(rng, size).cloned().collect()
    };
    Pack { id, cards }
}

/// Build a round of six independently drawn packs.
///
/// Each pack samples the full pool, so the same card can show up in more than
/// one pack of the round.
pub fn create_round(round_number: u32, pool: &[Card]) -> Round {
    create_round_with(round_number, pool, &mut rand::rng())
}

pub(crate) fn create_round_with<R: Rng + ?Sized>(
    round_number: u32,
    pool: &[Card],
    rng: &mut R,
) -> Round {
    if pool.len() < PACK_SIZE {
        warn!(
            "Card pool holds only {} cards; round {} will use short packs",
            pool.len(),
            round_number
        );
    }

    let first_id = round_number.saturating_sub(1) * PACKS_PER_ROUND as u32 + 1;
    let packs = (0..PACKS_PER_ROUND as u32)
        .map(|i| create_pack_with(first_id + i, pool, PACK_SIZE, rng))
        .collect();

    Round {
        number: round_number,
        packs,
    }
}
