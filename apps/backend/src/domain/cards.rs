//! Core card types for the 32-card Omi deck.
//!
//! A card is an integer id in `0..32`: `suit = id / 8`, `rank = id % 8`,
//! over the fixed orderings below. Ids are what clients send and what we
//! persist; `Suit`/`Rank` are derived on demand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::domain::{DomainError, ValidationKind};

pub const DECK_SIZE: usize = 32;
pub const CARDS_PER_SUIT: u8 = 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[serde(alias = "SPADES")]
    Spades,
    #[serde(alias = "HEARTS")]
    Hearts,
    #[serde(alias = "CLUBS")]
    Clubs,
    #[serde(alias = "DIAMONDS")]
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub const fn index(self) -> u8 {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Clubs => 2,
            Suit::Diamonds => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Hearts => "Hearts",
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suit {
    type Err = DomainError;

    /// Case-insensitive suit name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suit::ALL
            .into_iter()
            .find(|suit| suit.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidTrickSuit,
                    format!("Unknown suit '{s}'"),
                )
            })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Base trick value: 7 = 1 up to Ace = 8.
    pub const fn value(self) -> u8 {
        self.index() + 1
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One card of the Omi deck, stored as its id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Card(u8);

impl Card {
    pub fn new(id: u8) -> Result<Self, DomainError> {
        if usize::from(id) >= DECK_SIZE {
            return Err(DomainError::validation(
                ValidationKind::InvalidCard,
                format!("Card id {id} is outside 0..{DECK_SIZE}"),
            ));
        }
        Ok(Self(id))
    }

    pub fn from_parts(suit: Suit, rank: Rank) -> Self {
        Self(suit.index() * CARDS_PER_SUIT + rank.index())
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn suit(self) -> Suit {
        Suit::ALL[usize::from(self.0 / CARDS_PER_SUIT)]
    }

    pub fn rank(self) -> Rank {
        Rank::ALL[usize::from(self.0 % CARDS_PER_SUIT)]
    }

    /// All 32 cards in id order.
    pub fn deck() -> [Card; DECK_SIZE] {
        let mut deck = [Card(0); DECK_SIZE];
        for (id, slot) in deck.iter_mut().enumerate() {
            *slot = Card(id as u8);
        }
        deck
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.suit(), self.rank().as_str())
    }
}

impl TryFrom<i64> for Card {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let id = u8::try_from(value).map_err(|_| {
            DomainError::validation(
                ValidationKind::InvalidCard,
                format!("Card id {value} is outside 0..{DECK_SIZE}"),
            )
        })?;
        Card::new(id)
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = i64::deserialize(deserializer)?;
        Card::try_from(id).map_err(serde::de::Error::custom)
    }
}

/// Client-facing description of a card: `{number, suit, rank}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFace {
    pub number: u8,
    pub suit: Suit,
    pub rank: Rank,
}

impl From<Card> for CardFace {
    fn from(card: Card) -> Self {
        Self {
            number: card.id(),
            suit: card.suit(),
            rank: card.rank(),
        }
    }
}

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit() == suit)
}
