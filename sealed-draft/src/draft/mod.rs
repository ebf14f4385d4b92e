// Sealed draft core: cards, packs, the turn state machine, and the tally.

pub mod card;
pub mod pack;
pub mod state;
pub mod tally;
