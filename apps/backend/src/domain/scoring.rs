//! Round settlement: who lost the round and how many points it costs them.

use serde::Serialize;

use crate::domain::{Seat, Team};

/// Move wins per team, indexed by `Team::index`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct MoveWins {
    pub red: u8,
    pub black: u8,
}

impl MoveWins {
    pub fn get(&self, team: Team) -> u8 {
        match team {
            Team::Red => self.red,
            Team::Black => self.black,
        }
    }

    pub fn record(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Black => self.black += 1,
        }
    }

    pub fn total(&self) -> u8 {
        self.red + self.black
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSettlement {
    pub tied: bool,
    pub winner: Option<Team>,
    pub loser: Option<Team>,
    /// Points taken off the loser; 0 on a tie.
    pub deduction: u8,
}

/// Settle a finished round.
///
/// The loser pays 2 if the previous round was tied or if they called trump
/// this round, 1 otherwise. A tie changes no score.
pub fn settle_round(
    move_wins: MoveWins,
    caller_seat: Seat,
    previous_round_tied: bool,
) -> RoundSettlement {
    if move_wins.red == move_wins.black {
        return RoundSettlement {
            tied: true,
            winner: None,
            loser: None,
            deduction: 0,
        };
    }

    let loser = if move_wins.red < move_wins.black {
        Team::Red
    } else {
        Team::Black
    };
    let deduction = if previous_round_tied || loser == Team::for_seat(caller_seat) {
        2
    } else {
        1
    };

    RoundSettlement {
        tied: false,
        winner: Some(loser.opponent()),
        loser: Some(loser),
        deduction,
    }
}
