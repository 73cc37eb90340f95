pub mod basic;
pub mod deck;

pub use basic::{Card, CardParseError, Rank, Suit};
pub use deck::{build_deck, shuffle, shuffled_deck, sort_for_display, DECK_SIZE};
