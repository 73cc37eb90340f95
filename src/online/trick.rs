use super::{
    errors::GameError,
    models::{GameStatus, Hand, OnlineGame, PlayedCard, SEATS, TRICKS_PER_ROUND},
};
use crate::cards::{Card, Suit};

/// Spades beat every other suit
pub const TRUMP: Suit = Suit::Spades;

/// What a successful play did to the trick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The trick still needs more cards
    Continued { next_seat: u8 },
    /// The fourth card landed and `winner_seat` took the trick
    TrickComplete { winner_seat: u8 },
}

/// Result of asking for the next trick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTrick {
    /// A new trick is open for the previous winner to lead
    Started { trick: u32 },
    /// That was the last trick of the round
    RoundComplete,
    /// The trick had already moved on, nothing changed
    Skipped,
}

/// Cards from `hand` that may legally be played into a trick led with
/// `trick_suit`
pub fn legal_cards(hand: &[Card], trick_suit: Option<Suit>) -> Vec<Card> {
    match trick_suit {
        Some(suit) if hand.iter().any(|c| c.suit == suit) => {
            hand.iter().filter(|c| c.suit == suit).copied().collect()
        }
        _ => hand.to_vec(),
    }
}

/// The highest trump if any was played, otherwise the highest card of the
/// led suit. `None` only for an empty table.
pub fn trick_winner(cards: &[PlayedCard], led: Suit) -> Option<&PlayedCard> {
    let best_of = |suit: Suit| {
        cards
            .iter()
            .filter(|p| p.card.suit == suit)
            .max_by_key(|p| p.card.value())
    };
    best_of(TRUMP).or_else(|| best_of(led))
}

/// Plays `card` for player `uid`, removing it from `hand`. Everything is
/// validated before anything changes, so on error neither the game nor the
/// hand has been touched.
pub fn play_card(
    game: &mut OnlineGame,
    hand: &mut Hand,
    uid: &str,
    card: Card,
) -> Result<PlayOutcome, GameError> {
    let seat = game
        .player(uid)
        .map(|p| p.seat)
        .ok_or_else(|| GameError::NotSeated(uid.to_string()))?;

    if game.status != GameStatus::Playing {
        return Err(GameError::InvalidPhase(game.status));
    }
    if game.current_turn_seat != seat {
        return Err(GameError::NotYourTurn {
            expected: game.current_turn_seat,
        });
    }
    let position = hand
        .iter()
        .position(|c| *c == card)
        .ok_or(GameError::CardNotInHand(card))?;
    if let Some(led) = game.trick_suit {
        if card.suit != led && hand.iter().any(|c| c.suit == led) {
            return Err(GameError::MustFollowSuit(led));
        }
    }

    hand.remove(position);
    game.cards_on_table.push(PlayedCard { seat, card });
    let led = *game.trick_suit.get_or_insert(card.suit);
    game.current_turn_seat = (seat + 1) % SEATS;

    if game.cards_on_table.len() < SEATS as usize {
        return Ok(PlayOutcome::Continued {
            next_seat: game.current_turn_seat,
        });
    }

    let winner_seat = trick_winner(&game.cards_on_table, led)
        .map(|p| p.seat)
        .unwrap_or(seat);

    game.status = GameStatus::TrickScoring;
    game.last_trick_winner_seat = Some(winner_seat);
    game.current_turn_seat = winner_seat;
    if let Some(winner) = game.players.iter_mut().find(|p| p.seat == winner_seat) {
        winner.tricks_won += 1;
    }

    Ok(PlayOutcome::TrickComplete { winner_seat })
}

/// Clears the table after a scored trick. Safe to call more than once: once
/// the game has left `trick_scoring` this does nothing.
pub fn start_next_trick(game: &mut OnlineGame) -> NextTrick {
    if game.status != GameStatus::TrickScoring {
        return NextTrick::Skipped;
    }

    game.cards_on_table.clear();
    game.trick_suit = None;
    game.current_trick += 1;

    if game.current_trick > TRICKS_PER_ROUND {
        // TODO: score the round from calls and tricks won, then move to
        // `calling` for the next round or to `finished`
        game.status = GameStatus::RoundScoring;
        NextTrick::RoundComplete
    } else {
        game.status = GameStatus::Playing;
        NextTrick::Started {
            trick: game.current_trick,
        }
    }
}
