use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::tricks::{
    card_value, highest_play, is_legal_play, legal_cards, resolve_move, validate_play, MovePlay,
};
use crate::errors::domain::ValidationKind;

fn c(suit: Suit, rank: Rank) -> Card {
    Card::from_parts(suit, rank)
}

fn plays(cards: &[(u8, Card)]) -> Vec<MovePlay> {
    cards
        .iter()
        .map(|(slot, card)| MovePlay {
            slot: *slot,
            card: *card,
        })
        .collect()
}

#[test]
fn value_adds_trump_bonus() {
    assert_eq!(card_value(c(Suit::Hearts, Rank::Seven), Suit::Hearts, Some(Suit::Clubs)), 9);
    assert_eq!(card_value(c(Suit::Hearts, Rank::Ace), Suit::Hearts, None), 16);
}

#[test]
fn value_of_led_suit_is_rank_value() {
    assert_eq!(card_value(c(Suit::Clubs, Rank::Ace), Suit::Hearts, Some(Suit::Clubs)), 8);
    assert_eq!(card_value(c(Suit::Clubs, Rank::Jack), Suit::Hearts, Some(Suit::Clubs)), 5);
}

#[test]
fn off_suit_discard_is_worthless() {
    assert_eq!(
        card_value(c(Suit::Diamonds, Rank::Ace), Suit::Hearts, Some(Suit::Clubs)),
        0
    );
}

#[test]
fn trump_seven_beats_led_ace() {
    let move_plays = plays(&[
        (1, c(Suit::Clubs, Rank::Seven)),
        (2, c(Suit::Clubs, Rank::Ace)),
        (3, c(Suit::Hearts, Rank::Seven)),
        (0, c(Suit::Clubs, Rank::King)),
    ]);
    let winner = resolve_move(&move_plays, Suit::Hearts).unwrap();
    assert_eq!(winner.slot, 3);
    assert_eq!(winner.card, c(Suit::Hearts, Rank::Seven));
}

#[test]
fn highest_trump_wins_among_trumps() {
    let move_plays = plays(&[
        (0, c(Suit::Spades, Rank::Nine)),
        (1, c(Suit::Hearts, Rank::Ten)),
        (2, c(Suit::Hearts, Rank::Queen)),
        (3, c(Suit::Spades, Rank::Ace)),
    ]);
    assert_eq!(resolve_move(&move_plays, Suit::Hearts).unwrap().slot, 2);
}

#[test]
fn leader_wins_when_nobody_follows_or_trumps() {
    let move_plays = plays(&[
        (2, c(Suit::Clubs, Rank::Seven)),
        (3, c(Suit::Diamonds, Rank::Ace)),
        (0, c(Suit::Diamonds, Rank::King)),
        (1, c(Suit::Spades, Rank::Ace)),
    ]);
    assert_eq!(resolve_move(&move_plays, Suit::Hearts).unwrap().slot, 2);
}

#[test]
fn zero_value_tie_keeps_earliest_play() {
    let discards = plays(&[
        (1, c(Suit::Diamonds, Rank::Ace)),
        (2, c(Suit::Clubs, Rank::Ace)),
        (3, c(Suit::Diamonds, Rank::Seven)),
    ]);
    let winner = highest_play(&discards, Suit::Hearts, Some(Suit::Spades)).unwrap();
    assert_eq!(winner.slot, 1);
}

#[test]
fn must_follow_when_holding_lead_suit() {
    let hand = vec![c(Suit::Clubs, Rank::Nine), c(Suit::Hearts, Rank::Ace)];
    assert!(!is_legal_play(&hand, hand[1], Some(Suit::Clubs)));
    assert!(is_legal_play(&hand, hand[0], Some(Suit::Clubs)));
    let err = validate_play(&hand, hand[1], Some(Suit::Clubs)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::MustFollowSuit));
}

#[test]
fn void_hand_may_play_anything() {
    let hand = vec![c(Suit::Diamonds, Rank::Nine), c(Suit::Hearts, Rank::Ace)];
    assert_eq!(legal_cards(&hand, Some(Suit::Clubs)), hand);
}

#[test]
fn leading_allows_any_card() {
    let hand = vec![c(Suit::Diamonds, Rank::Nine), c(Suit::Hearts, Rank::Ace)];
    assert_eq!(legal_cards(&hand, None), hand);
}

#[test]
fn card_must_be_in_hand() {
    let hand = vec![c(Suit::Diamonds, Rank::Nine)];
    let err = validate_play(&hand, c(Suit::Spades, Rank::Ace), None).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::CardNotInHand));
}
