//! What one seat is allowed to see of the current round.

use serde::Serialize;

use crate::domain::cards::{CardFace, Suit};
use crate::domain::round::{RoundState, RoundStatus};
use crate::domain::scoring::MoveWins;
use crate::domain::tricks::MovePlay;
use crate::domain::Seat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_no: u32,
    pub status: RoundStatus,
    pub caller_slot: Seat,
    pub trick_suit: Option<Suit>,
    pub current_suit: Option<Suit>,
    pub move_no: u8,
    pub move_active_slot: Seat,
    pub move_current_slot: Seat,
    pub current_move: Vec<MovePlay>,
    pub move_wins: MoveWins,
    pub player_slot: Seat,
    /// Own cards, filtered by the partial-reveal rule.
    pub hand: Vec<CardFace>,
    /// Card counts per seat, so opponents' holdings stay hidden.
    pub hand_sizes: [usize; 4],
}

impl RoundView {
    pub fn for_seat(round: &RoundState, seat: Seat) -> Self {
        Self {
            round_no: round.round_no,
            status: round.status,
            caller_slot: round.caller_slot,
            trick_suit: round.trick_suit,
            current_suit: round.current_suit,
            move_no: round.move_no,
            move_active_slot: round.move_active_slot,
            move_current_slot: round.move_current_slot,
            current_move: round.current_move.clone(),
            move_wins: round.move_wins,
            player_slot: seat,
            hand: round
                .visible_hand(seat)
                .into_iter()
                .map(CardFace::from)
                .collect(),
            hand_sizes: std::array::from_fn(|s| round.hands[s].len()),
        }
    }
}
