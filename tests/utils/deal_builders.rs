//! Predetermined deals for driving the trick engine
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashSet;

use callbridge::{
    cards::{build_deck, sort_for_display},
    online::Hand,
    Card, Suit,
};

pub fn card(code: &str) -> Card {
    Card::from_code(code).unwrap()
}

pub fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|code| card(code)).collect()
}

// ============================================================================
// Deal Builder
// ============================================================================

/// Builds four hands indexed by seat. Cards not placed explicitly are dealt
/// out in deck order to whichever seats are still short.
pub struct DealBuilder {
    hands: Vec<Hand>,
}

impl DealBuilder {
    pub fn new() -> Self {
        Self {
            hands: vec![Vec::new(); 4],
        }
    }

    /// Seat 0 spades, seat 1 hearts, seat 2 diamonds, seat 3 clubs
    pub fn suit_per_seat() -> Self {
        let mut builder = Self::new();
        for (seat, suit) in [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs]
            .into_iter()
            .enumerate()
        {
            builder.hands[seat] = build_deck().into_iter().filter(|c| c.suit == suit).collect();
        }
        builder
    }

    pub fn with_hand(mut self, seat: usize, codes: &[&str]) -> Self {
        self.hands[seat].extend(cards(codes));
        self
    }

    pub fn build(mut self) -> Vec<Hand> {
        let placed: HashSet<Card> = self.hands.iter().flatten().copied().collect();
        let mut remaining = build_deck().into_iter().filter(|c| !placed.contains(c));

        for hand in self.hands.iter_mut() {
            while hand.len() < 13 {
                match remaining.next() {
                    Some(card) => hand.push(card),
                    None => break,
                }
            }
            sort_for_display(hand);
        }
        self.hands
    }
}
