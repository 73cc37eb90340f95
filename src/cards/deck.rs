use rand::Rng;
use strum::IntoEnumIterator;

use super::basic::{Card, Rank, Suit};

pub const DECK_SIZE: usize = 52;

/// All 52 cards, suit by suit, each rank once.
pub fn build_deck() -> Vec<Card> {
    Suit::iter()
        .flat_map(|suit| Rank::iter().map(move |rank| Card::new(rank, suit)))
        .collect()
}

/// Fisher-Yates: walk from the end, swapping each slot with a uniformly
/// chosen slot at or before it.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = build_deck();
    shuffle(&mut deck, rng);
    deck
}

/// Suit priority first (spades, hearts, diamonds, clubs), then rank high to low.
pub fn sort_for_display(cards: &mut [Card]) {
    cards.sort_by(|a, b| b.cmp(a));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_build_deck_has_every_card_once() {
        let deck = build_deck();
        assert_eq!(deck.len(), DECK_SIZE);

        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);

        for suit in Suit::iter() {
            assert_eq!(deck.iter().filter(|c| c.suit == suit).count(), 13);
        }
        assert!(deck.iter().all(|c| (2..=14).contains(&c.value())));
    }

    #[test]
    fn test_shuffle_preserves_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), DECK_SIZE);

        deck.sort();
        let mut fresh = build_deck();
        fresh.sort();
        assert_eq!(deck, fresh);
    }

    #[test]
    fn test_shuffle_is_deterministic_for_a_seed() {
        let a = shuffled_deck(&mut StdRng::seed_from_u64(42));
        let b = shuffled_deck(&mut StdRng::seed_from_u64(42));
        let c = shuffled_deck(&mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
        let trials = 60_000;

        for _ in 0..trials {
            let mut items = [0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }

        assert_eq!(counts.len(), 6, "every permutation should appear");
        let expected = trials / 6;
        for (perm, count) in counts {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(
                deviation < 0.05,
                "permutation {:?} seen {} times, expected about {}",
                perm,
                count,
                expected
            );
        }
    }

    #[test]
    fn test_shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: [Card; 0] = [];
        shuffle(&mut empty, &mut rng);

        let mut one = [Card::new(Rank::Ace, Suit::Spades)];
        shuffle(&mut one, &mut rng);
        assert_eq!(one[0], Card::new(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn test_sort_for_display() {
        let mut cards = vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Three, Suit::Spades),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Ten, Suit::Diamonds),
        ];
        sort_for_display(&mut cards);

        assert_eq!(
            cards,
            vec![
                Card::new(Rank::King, Suit::Spades),
                Card::new(Rank::Three, Suit::Spades),
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Two, Suit::Clubs),
            ]
        );
    }
}
