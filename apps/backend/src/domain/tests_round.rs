//! Round state machine: trump selection, turn order, full rounds.

use crate::domain::round::{RoundState, RoundStatus};
use crate::domain::tricks::legal_cards;
use crate::domain::{Card, Suit};
use crate::errors::domain::ValidationKind;

fn ids(cards: &[Card]) -> Vec<u8> {
    cards.iter().map(|c| c.id()).collect()
}

fn card(id: u8) -> Card {
    Card::new(id).unwrap()
}

/// Play the whole round taking the first legal card each turn.
/// Returns `(plays, winner_slot)` per move.
fn play_out(round: &mut RoundState) -> Vec<(Vec<(u8, u8)>, u8)> {
    let mut log = Vec::new();
    while !round.is_complete() {
        let seat = round.move_current_slot;
        let follow = if round.current_move.is_empty() {
            None
        } else {
            round.current_suit
        };
        let choice = legal_cards(round.hand(seat), follow)[0];
        let outcome = round.play_card(seat, choice).unwrap();
        if let Some(done) = outcome.completed_move {
            let plays = done.plays.iter().map(|p| (p.slot, p.card.id())).collect();
            log.push((plays, done.winner.slot));
        }
    }
    log
}

#[test]
fn fresh_round_waits_for_caller() {
    let round = RoundState::deal(1, 12345, 0);
    assert_eq!(round.status, RoundStatus::WaitingForTrickSuit);
    assert_eq!(round.move_no, 1);
    assert_eq!(round.move_current_slot, 0);
    assert_eq!(round.cards_in_play(), 32);
}

#[test]
fn only_caller_sees_first_four_before_trump() {
    let mut round = RoundState::deal(1, 12345, 0);
    assert_eq!(ids(&round.visible_hand(0)), vec![11, 24, 21, 16]);
    assert!(round.visible_hand(1).is_empty());
    assert!(round.visible_hand(2).is_empty());

    round.select_trick_suit(0, Suit::Spades).unwrap();
    assert_eq!(round.visible_hand(0).len(), 8);
    assert_eq!(ids(&round.visible_hand(1)), vec![26, 6, 2, 17, 25, 22, 12, 14]);
}

#[test]
fn non_caller_cannot_pick_trump() {
    let mut round = RoundState::deal(1, 12345, 0);
    let err = round.select_trick_suit(1, Suit::Hearts).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotCaller));
    assert_eq!(round.trick_suit, None);
}

#[test]
fn trump_is_chosen_once() {
    let mut round = RoundState::deal(1, 12345, 0);
    round.select_trick_suit(0, Suit::Spades).unwrap();
    let err = round.select_trick_suit(0, Suit::Hearts).unwrap_err();
    assert_eq!(
        err.validation_kind(),
        Some(&ValidationKind::TrickSuitAlreadySelected)
    );
    assert_eq!(round.trick_suit, Some(Suit::Spades));
}

#[test]
fn cannot_play_before_trump() {
    let mut round = RoundState::deal(1, 12345, 0);
    let err = round.play_card(0, card(11)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));
}

#[test]
fn rejects_out_of_turn_and_foreign_cards() {
    let mut round = RoundState::deal(1, 12345, 0);
    round.select_trick_suit(0, Suit::Spades).unwrap();

    let err = round.play_card(1, card(26)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::OutOfTurn));

    let err = round.play_card(0, card(26)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::CardNotInHand));
    assert_eq!(round.cards_in_play(), 32);
}

#[test]
fn enforces_follow_suit_within_move() {
    let mut round = RoundState::deal(1, 12345, 0);
    round.select_trick_suit(0, Suit::Spades).unwrap();
    // Seat 0 leads 11 (Hearts 10); seat 1 holds Hearts 12 and 14.
    let first = round.play_card(0, card(11)).unwrap();
    assert!(first.is_first_in_move);
    assert_eq!(round.current_suit, Some(Suit::Hearts));

    let err = round.play_card(1, card(26)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::MustFollowSuit));

    let second = round.play_card(1, card(12)).unwrap();
    assert!(!second.is_first_in_move);
    assert!(!second.is_last_in_move);
    assert_eq!(round.move_current_slot, 2);
}

#[test]
fn full_round_seed_12345_matches_recorded_log() {
    let mut round = RoundState::deal(1, 12345, 0);
    round.select_trick_suit(0, Suit::Spades).unwrap();
    let log = play_out(&mut round);

    let expected: Vec<(Vec<(u8, u8)>, u8)> = vec![
        (vec![(0, 11), (1, 12), (2, 9), (3, 15)], 3),
        (vec![(3, 5), (0, 3), (1, 6), (2, 0)], 1),
        (vec![(1, 26), (2, 28), (3, 27), (0, 24)], 2),
        (vec![(2, 30), (3, 31), (0, 29), (1, 25)], 3),
        (vec![(3, 19), (0, 21), (1, 17), (2, 18)], 0),
        (vec![(0, 16), (1, 22), (2, 13), (3, 20)], 1),
        (vec![(1, 2), (2, 7), (3, 4), (0, 1)], 2),
        (vec![(2, 10), (3, 8), (0, 23), (1, 14)], 1),
    ];
    assert_eq!(log, expected);
    assert_eq!(round.move_wins.red, 3);
    assert_eq!(round.move_wins.black, 5);
    assert_eq!(round.status, RoundStatus::Completed);
    assert_eq!(round.move_no, 9);
    assert_eq!(round.cards_in_play(), 0);
}

#[test]
fn completed_round_rejects_further_plays() {
    let mut round = RoundState::deal(1, 0, 0);
    round.select_trick_suit(0, Suit::Spades).unwrap();
    play_out(&mut round);
    assert_eq!(round.move_wins.red, 4);
    assert_eq!(round.move_wins.black, 4);
    let err = round.play_card(round.move_current_slot, card(0)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));
}

#[test]
fn card_conservation_holds_after_every_play() {
    let mut round = RoundState::deal(1, 42, 2);
    round.select_trick_suit(2, Suit::Diamonds).unwrap();
    let mut played = 0usize;
    while !round.is_complete() {
        let seat = round.move_current_slot;
        let follow = if round.current_move.is_empty() {
            None
        } else {
            round.current_suit
        };
        let choice = *legal_cards(round.hand(seat), follow).last().unwrap();
        let outcome = round.play_card(seat, choice).unwrap();
        played += 1;
        assert!(!round.hand(seat).contains(&choice));
        let completed_cards = (played / 4) * 4;
        assert_eq!(round.cards_in_play() + completed_cards, 32);
        assert_eq!(outcome.is_last_in_move, played % 4 == 0);
    }
    assert_eq!(round.move_wins.total(), 8);
}
