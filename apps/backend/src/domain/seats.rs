//! Seats and teams. Even seats play for RED, odd seats for BLACK.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Fixed table position, 0..=3.
pub type Seat = u8;

pub const SEATS: usize = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "TEAM_RED")]
    Red,
    #[serde(rename = "TEAM_BLACK")]
    Black,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::Red, Team::Black];

    pub fn for_seat(seat: Seat) -> Team {
        if seat % 2 == 0 {
            Team::Red
        } else {
            Team::Black
        }
    }

    /// The two seats this team owns, lower seat first.
    pub fn seats(self) -> [Seat; 2] {
        match self {
            Team::Red => [0, 2],
            Team::Black => [1, 3],
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Black,
            Team::Black => Team::Red,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::Red => 0,
            Team::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Red => "TEAM_RED",
            Team::Black => "TEAM_BLACK",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEAM_RED" => Ok(Team::Red),
            "TEAM_BLACK" => Ok(Team::Black),
            other => Err(DomainError::validation_other(format!(
                "Unknown team '{other}'"
            ))),
        }
    }
}

pub fn require_seat(seat: i64) -> Result<Seat, DomainError> {
    u8::try_from(seat)
        .ok()
        .filter(|s| usize::from(*s) < SEATS)
        .ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidSeat,
                format!("Seat {seat} is outside 0..{SEATS}"),
            )
        })
}

/// Seat after `seat`, clockwise.
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % SEATS as Seat
}
