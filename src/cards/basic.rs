use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("Invalid rank: {0}")]
    InvalidRank(String),
    #[error("Invalid suit: {0}")]
    InvalidSuit(String),
    #[error("Invalid card code: {0}")]
    InvalidCode(String),
    #[error("Card {card} carries inconsistent value fields")]
    InconsistentValue { card: String },
}

/// Suits in deal order. The discriminant is the display priority
/// (spades highest); it plays no part in trick resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades = 4,
    Hearts = 3,
    Diamonds = 2,
    Clubs = 1,
}

impl Suit {
    pub fn suit_value(self) -> u8 {
        self as u8
    }
}

impl PartialOrd for Suit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.suit_value().cmp(&other.suit_value())
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Suit::Spades => "S",
                Suit::Hearts => "H",
                Suit::Diamonds => "D",
                Suit::Clubs => "C",
            }
        )
    }
}

impl TryFrom<&str> for Suit {
    type Error = CardParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "S" | "spades" => Ok(Suit::Spades),
            "H" | "hearts" => Ok(Suit::Hearts),
            "D" | "diamonds" => Ok(Suit::Diamonds),
            "C" | "clubs" => Ok(Suit::Clubs),
            _ => Err(CardParseError::InvalidSuit(s.to_string())),
        }
    }
}

/// Ranks, ace high. The discriminant is the card's trick value (2..=14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Rank {
    #[serde(rename = "2")]
    Two = 2,
    #[serde(rename = "3")]
    Three = 3,
    #[serde(rename = "4")]
    Four = 4,
    #[serde(rename = "5")]
    Five = 5,
    #[serde(rename = "6")]
    Six = 6,
    #[serde(rename = "7")]
    Seven = 7,
    #[serde(rename = "8")]
    Eight = 8,
    #[serde(rename = "9")]
    Nine = 9,
    #[serde(rename = "10")]
    Ten = 10,
    #[serde(rename = "J")]
    Jack = 11,
    #[serde(rename = "Q")]
    Queen = 12,
    #[serde(rename = "K")]
    King = 13,
    #[serde(rename = "A")]
    Ace = 14,
}

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Rank::Two => "2",
                Rank::Three => "3",
                Rank::Four => "4",
                Rank::Five => "5",
                Rank::Six => "6",
                Rank::Seven => "7",
                Rank::Eight => "8",
                Rank::Nine => "9",
                Rank::Ten => "10",
                Rank::Jack => "J",
                Rank::Queen => "Q",
                Rank::King => "K",
                Rank::Ace => "A",
            }
        )
    }
}

impl TryFrom<&str> for Rank {
    type Error = CardParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "2" => Ok(Rank::Two),
            "3" => Ok(Rank::Three),
            "4" => Ok(Rank::Four),
            "5" => Ok(Rank::Five),
            "6" => Ok(Rank::Six),
            "7" => Ok(Rank::Seven),
            "8" => Ok(Rank::Eight),
            "9" => Ok(Rank::Nine),
            "10" | "T" => Ok(Rank::Ten),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "A" => Ok(Rank::Ace),
            _ => Err(CardParseError::InvalidRank(s.to_string())),
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

/// A playing card. Identity is `(rank, suit)`; `value` and `suitValue` are
/// derived and only written out so stored documents keep their full shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "CardDocument", try_from = "CardDocument")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

/// Ordered by suit priority, then rank. Display order is the reverse.
impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.suit.cmp(&other.suit) {
            std::cmp::Ordering::Equal => self.rank.cmp(&other.rank),
            other => other,
        }
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    pub fn suit_value(&self) -> u8 {
        self.suit.suit_value()
    }

    /// Parses codes such as `"AS"`, `"10H"` or `"TD"`.
    pub fn from_code(code: &str) -> Result<Self, CardParseError> {
        if !code.is_ascii() || code.len() < 2 || code.len() > 3 {
            return Err(CardParseError::InvalidCode(code.to_string()));
        }

        let (rank, suit) = code.split_at(code.len() - 1);
        let rank = Rank::try_from(rank)?;
        let suit = Suit::try_from(suit)?;

        Ok(Self::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardDocument {
    suit: Suit,
    rank: Rank,
    #[serde(default)]
    value: Option<u8>,
    #[serde(default)]
    suit_value: Option<u8>,
}

impl From<Card> for CardDocument {
    fn from(card: Card) -> Self {
        Self {
            suit: card.suit,
            rank: card.rank,
            value: Some(card.value()),
            suit_value: Some(card.suit_value()),
        }
    }
}

impl TryFrom<CardDocument> for Card {
    type Error = CardParseError;

    fn try_from(doc: CardDocument) -> Result<Self, Self::Error> {
        let card = Card::new(doc.rank, doc.suit);
        let value_ok = doc.value.map_or(true, |v| v == card.value());
        let suit_value_ok = doc.suit_value.map_or(true, |v| v == card.suit_value());
        if !(value_ok && suit_value_ok) {
            return Err(CardParseError::InconsistentValue {
                card: card.to_string(),
            });
        }
        Ok(card)
    }
}
