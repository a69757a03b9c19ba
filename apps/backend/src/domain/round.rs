//! One round of Omi: deal, trump selection, eight moves.
//!
//! `RoundState` is a plain value. Operations validate, mutate in place and
//! report what happened so the caller can persist and notify.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Suit};
use crate::domain::dealing::{deal_hands, preview, HAND_SIZE};
use crate::domain::scoring::MoveWins;
use crate::domain::seats::{next_seat, Seat, Team, SEATS};
use crate::domain::tricks::{resolve_move, validate_play, MovePlay};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

pub const MOVES_PER_ROUND: u8 = HAND_SIZE as u8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    WaitingForTrickSuit,
    Active,
    Completed,
}

impl RoundStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoundStatus::WaitingForTrickSuit => "waiting_for_trick_suit",
            RoundStatus::Active => "active",
            RoundStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "waiting_for_trick_suit" => Ok(RoundStatus::WaitingForTrickSuit),
            "active" => Ok(RoundStatus::Active),
            "completed" => Ok(RoundStatus::Completed),
            other => Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Unknown round status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub round_no: u32,
    pub seed: u32,
    /// Seat that calls trump this round.
    pub caller_slot: Seat,
    pub status: RoundStatus,
    pub hands: [Vec<Card>; SEATS],
    pub trick_suit: Option<Suit>,
    /// Suit the open move must follow; `None` between moves.
    pub current_suit: Option<Suit>,
    /// 1..=8 while playing, 9 once the round is complete.
    pub move_no: u8,
    pub move_active_slot: Seat,
    pub move_current_slot: Seat,
    pub current_move: Vec<MovePlay>,
    pub move_wins: MoveWins,
}

/// A move that just received its fourth card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMove {
    pub move_no: u8,
    pub plays: Vec<MovePlay>,
    pub winner: MovePlay,
    pub winner_team: Team,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub play: MovePlay,
    /// Move number the card was played into.
    pub move_no: u8,
    pub is_first_in_move: bool,
    pub is_last_in_move: bool,
    pub completed_move: Option<CompletedMove>,
    pub round_complete: bool,
}

impl RoundState {
    /// Shuffle with `seed` and deal a fresh round for `caller_slot`.
    pub fn deal(round_no: u32, seed: u32, caller_slot: Seat) -> Self {
        Self {
            round_no,
            seed,
            caller_slot,
            status: RoundStatus::WaitingForTrickSuit,
            hands: deal_hands(seed),
            trick_suit: None,
            current_suit: None,
            move_no: 1,
            move_active_slot: caller_slot,
            move_current_slot: caller_slot,
            current_move: Vec::new(),
            move_wins: MoveWins::default(),
        }
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[usize::from(seat)]
    }

    /// Cards `seat` is allowed to see right now.
    ///
    /// Before trump is chosen only the caller sees its first four cards.
    pub fn visible_hand(&self, seat: Seat) -> Vec<Card> {
        match self.status {
            RoundStatus::WaitingForTrickSuit if seat == self.caller_slot => {
                preview(self.hand(seat)).to_vec()
            }
            RoundStatus::WaitingForTrickSuit => Vec::new(),
            _ => self.hand(seat).to_vec(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RoundStatus::Completed
    }

    pub fn select_trick_suit(&mut self, seat: Seat, suit: Suit) -> Result<(), DomainError> {
        if self.trick_suit.is_some() {
            return Err(DomainError::validation(
                ValidationKind::TrickSuitAlreadySelected,
                format!("Trick suit already selected for round {}", self.round_no),
            ));
        }
        if self.status != RoundStatus::WaitingForTrickSuit {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Round is {}", self.status.as_str()),
            ));
        }
        if seat != self.caller_slot {
            return Err(DomainError::validation(
                ValidationKind::NotCaller,
                format!("Seat {seat} is not the caller (seat {})", self.caller_slot),
            ));
        }
        self.trick_suit = Some(suit);
        self.status = RoundStatus::Active;
        Ok(())
    }

    /// Validate and apply one card play: turn, ownership, then suit-following.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, DomainError> {
        let trick_suit = match (self.status, self.trick_suit) {
            (RoundStatus::Active, Some(suit)) => suit,
            _ => {
                return Err(DomainError::validation(
                    ValidationKind::PhaseMismatch,
                    format!("Cannot play while round is {}", self.status.as_str()),
                ))
            }
        };
        if seat != self.move_current_slot {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                format!("Seat {} is to play, not {seat}", self.move_current_slot),
            ));
        }

        let is_first_in_move = self.current_move.is_empty();
        let follow = if is_first_in_move {
            None
        } else {
            self.current_suit
        };
        validate_play(self.hand(seat), card, follow)?;

        self.hands[usize::from(seat)].retain(|c| *c != card);
        if is_first_in_move {
            self.current_suit = Some(card.suit());
        }
        let play = MovePlay { slot: seat, card };
        self.current_move.push(play);
        self.move_current_slot = next_seat(seat);

        let move_no = self.move_no;
        let is_last_in_move = self.current_move.len() == SEATS;
        let mut completed_move = None;

        if is_last_in_move {
            let plays = std::mem::take(&mut self.current_move);
            let winner = resolve_move(&plays, trick_suit).ok_or_else(|| {
                DomainError::infra(InfraErrorKind::DataCorruption, "Completed move has no plays")
            })?;
            let winner_team = Team::for_seat(winner.slot);
            self.move_wins.record(winner_team);
            self.move_active_slot = winner.slot;
            self.move_current_slot = winner.slot;
            self.current_suit = None;
            self.move_no += 1;
            if self.move_no > MOVES_PER_ROUND {
                self.status = RoundStatus::Completed;
            }
            completed_move = Some(CompletedMove {
                move_no,
                plays,
                winner,
                winner_team,
            });
        }

        Ok(PlayOutcome {
            play,
            move_no,
            is_first_in_move,
            is_last_in_move,
            completed_move,
            round_complete: self.is_complete(),
        })
    }

    /// Cards still held plus cards in the open move.
    pub fn cards_in_play(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>() + self.current_move.len()
    }
}
