use serde::{Deserialize, Serialize};

use crate::domain::cards::{hand_has_suit, Card, Suit};
use crate::domain::Seat;
use crate::errors::domain::{DomainError, ValidationKind};

/// Trump bonus added to a card of the trick suit.
pub const TRUMP_BONUS: u8 = 8;

/// One card laid into the open move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlay {
    pub slot: Seat,
    pub card: Card,
}

/// Whether `card` may be played from `hand` given the suit being followed.
///
/// With no current suit (first card of a move) every card is legal. Otherwise
/// the card must follow unless the hand is void in that suit.
pub fn is_legal_play(hand: &[Card], card: Card, current_suit: Option<Suit>) -> bool {
    match current_suit {
        None => true,
        Some(lead) => card.suit() == lead || !hand_has_suit(hand, lead),
    }
}

/// Check ownership then legality, in that order.
pub fn validate_play(
    hand: &[Card],
    card: Card,
    current_suit: Option<Suit>,
) -> Result<(), DomainError> {
    if !hand.contains(&card) {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            format!("Card {card} is not in hand"),
        ));
    }
    if !is_legal_play(hand, card, current_suit) {
        let lead = current_suit.map(|s| s.as_str()).unwrap_or("any");
        return Err(DomainError::validation(
            ValidationKind::MustFollowSuit,
            format!("Must follow {lead}"),
        ));
    }
    Ok(())
}

/// Cards in `hand` that may legally be played, in hand order.
pub fn legal_cards(hand: &[Card], current_suit: Option<Suit>) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|c| is_legal_play(hand, *c, current_suit))
        .collect()
}

/// Value of `card` inside a move: rank value, plus 8 for trump, and 0 for
/// an off-suit discard.
pub fn card_value(card: Card, trick_suit: Suit, current_suit: Option<Suit>) -> u8 {
    let base = card.rank().value();
    if card.suit() == trick_suit {
        base + TRUMP_BONUS
    } else if Some(card.suit()) == current_suit {
        base
    } else {
        0
    }
}

/// Winning play of a completed move; the first card sets the suit to follow.
pub fn resolve_move(plays: &[MovePlay], trick_suit: Suit) -> Option<MovePlay> {
    let current_suit = plays.first().map(|p| p.card.suit());
    highest_play(plays, trick_suit, current_suit)
}

/// Highest-valued play. Equal values keep the earlier play, which can only
/// happen between zero-valued discards.
pub fn highest_play(
    plays: &[MovePlay],
    trick_suit: Suit,
    current_suit: Option<Suit>,
) -> Option<MovePlay> {
    let mut best: Option<(MovePlay, u8)> = None;
    for play in plays {
        let value = card_value(play.card, trick_suit, current_suit);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((*play, value)),
        }
    }
    best.map(|(play, _)| play)
}
