use rand::Rng;
use std::collections::{HashMap, HashSet};

use super::{
    errors::GameError,
    models::{GameStatus, Hand, OnlineGame, OnlinePlayer, PlayerInfo, SEATS, TRICKS_PER_ROUND},
};
use crate::cards::{shuffled_deck, sort_for_display, Card, DECK_SIZE};

/// Result of seating a player at a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAssignment {
    /// Newly seated
    Seated(u8),
    /// Was already at the table, nothing changed
    AlreadySeated(u8),
}

impl SeatAssignment {
    pub fn seat(self) -> u8 {
        match self {
            SeatAssignment::Seated(seat) | SeatAssignment::AlreadySeated(seat) => seat,
        }
    }
}

/// Seats a player in the lowest free seat. Joining twice is a no-op.
pub fn assign_seat(game: &mut OnlineGame, player: &PlayerInfo) -> Result<SeatAssignment, GameError> {
    if let Some(existing) = game.player(&player.uid) {
        return Ok(SeatAssignment::AlreadySeated(existing.seat));
    }
    if game.is_full() {
        return Err(GameError::GameFull);
    }
    if game.status != GameStatus::Waiting {
        return Err(GameError::AlreadyStarted);
    }

    let seat = (0..SEATS)
        .find(|seat| game.player_at(*seat).is_none())
        .ok_or(GameError::GameFull)?;
    game.players.push(OnlinePlayer::seated(player, seat));
    Ok(SeatAssignment::Seated(seat))
}

/// Preconditions for the host dealing and starting play
pub fn ensure_can_start(game: &OnlineGame, caller_uid: &str) -> Result<(), GameError> {
    if game.host_id != caller_uid {
        return Err(GameError::NotHost);
    }
    if game.players.len() != SEATS as usize {
        return Err(GameError::InsufficientPlayers(game.players.len()));
    }
    if game.status != GameStatus::Waiting {
        return Err(GameError::AlreadyStarted);
    }
    Ok(())
}

/// Shuffles a fresh deck and deals it round-robin: card `i` goes to seat
/// `i % 4`. Each hand comes back sorted for display.
pub fn deal_hands<R: Rng + ?Sized>(rng: &mut R) -> Vec<Hand> {
    let deck = shuffled_deck(rng);
    let mut hands: Vec<Hand> = (0..SEATS)
        .map(|_| Vec::with_capacity(TRICKS_PER_ROUND as usize))
        .collect();

    for (i, card) in deck.into_iter().enumerate() {
        hands[i % SEATS as usize].push(card);
    }
    for hand in hands.iter_mut() {
        sort_for_display(hand);
    }
    hands
}

/// Checks that hands indexed by seat split the whole deck into four
/// disjoint 13-card hands
pub fn validate_deal(hands: &[Hand]) -> Result<(), GameError> {
    if hands.len() != SEATS as usize {
        return Err(GameError::InvalidDeal(format!(
            "expected {} hands, got {}",
            SEATS,
            hands.len()
        )));
    }

    let mut seen: HashSet<Card> = HashSet::with_capacity(DECK_SIZE);
    for (seat, hand) in hands.iter().enumerate() {
        if hand.len() != TRICKS_PER_ROUND as usize {
            return Err(GameError::InvalidDeal(format!(
                "seat {} has {} cards",
                seat,
                hand.len()
            )));
        }
        for card in hand {
            if !seen.insert(*card) {
                return Err(GameError::InvalidDeal(format!("{} dealt twice", card)));
            }
        }
    }

    // 52 distinct cards can only be the whole deck
    Ok(())
}

/// Moves a full table into play with the given hands (indexed by seat) and
/// returns them keyed by player uid. Seat 0 leads the first trick.
pub fn begin_play(
    game: &mut OnlineGame,
    mut hands: Vec<Hand>,
) -> Result<HashMap<String, Hand>, GameError> {
    validate_deal(&hands)?;

    let mut by_uid = HashMap::with_capacity(hands.len());
    for player in game.players.iter_mut() {
        let hand = std::mem::take(&mut hands[player.seat as usize]);
        player.tricks_won = 0;
        by_uid.insert(player.uid.clone(), hand);
    }

    game.status = GameStatus::Playing;
    game.current_trick = 1;
    game.current_turn_seat = 0;
    game.trick_suit = None;
    game.cards_on_table.clear();
    game.last_trick_winner_seat = None;
    Ok(by_uid)
}
