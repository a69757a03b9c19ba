//! Session lifecycle: lobby, rounds, game end.

use serde::{Deserialize, Serialize};

use crate::domain::scoring::RoundSettlement;
use crate::domain::seats::{next_seat, Seat, Team, SEATS};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "active:select_trick_suit")]
    SelectTrickSuit,
    #[serde(rename = "active:game_play")]
    GamePlay,
    #[serde(rename = "active:round_ended")]
    RoundEnded,
    #[serde(rename = "active:game_ended")]
    GameEnded,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Active => "active",
            SessionStatus::SelectTrickSuit => "active:select_trick_suit",
            SessionStatus::GamePlay => "active:game_play",
            SessionStatus::RoundEnded => "active:round_ended",
            SessionStatus::GameEnded => "active:game_ended",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "waiting" => Ok(SessionStatus::Waiting),
            "active" => Ok(SessionStatus::Active),
            "active:select_trick_suit" => Ok(SessionStatus::SelectTrickSuit),
            "active:game_play" => Ok(SessionStatus::GamePlay),
            "active:round_ended" => Ok(SessionStatus::RoundEnded),
            "active:game_ended" => Ok(SessionStatus::GameEnded),
            other => Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Unknown session status '{other}'"),
            )),
        }
    }
}

/// Score thresholds for a game.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub starting_score: i32,
    /// A team at or below this score has lost the game.
    pub losing_score: i32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            starting_score: 10,
            losing_score: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub user_id: String,
    pub team: Team,
    pub slot: Seat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamScore {
    pub team_id: Team,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub id: String,
    pub status: SessionStatus,
    pub created_by: String,
    pub current_active_slot: Seat,
    pub current_round_no: u32,
    pub red_score: i32,
    pub black_score: i32,
    pub players: Vec<Player>,
    pub last_round_tied: bool,
    pub last_round_winner: Option<Team>,
    pub winner: Option<Team>,
}

/// Result of folding a round settlement into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementApplied {
    pub settlement: RoundSettlement,
    /// Caller for the next round.
    pub next_active_slot: Seat,
    pub game_winner: Option<Team>,
}

impl SessionState {
    /// New lobby with the creator seated on RED slot 0.
    pub fn create(id: impl Into<String>, creator: impl Into<String>, rules: &GameRules) -> Self {
        let creator = creator.into();
        Self {
            id: id.into(),
            status: SessionStatus::Waiting,
            created_by: creator.clone(),
            current_active_slot: 0,
            current_round_no: 0,
            red_score: rules.starting_score,
            black_score: rules.starting_score,
            players: vec![Player {
                user_id: creator,
                team: Team::Red,
                slot: 0,
            }],
            last_round_tied: false,
            last_round_winner: None,
            winner: None,
        }
    }

    pub fn score(&self, team: Team) -> i32 {
        match team {
            Team::Red => self.red_score,
            Team::Black => self.black_score,
        }
    }

    pub fn teams(&self) -> [TeamScore; 2] {
        Team::BOTH.map(|team| TeamScore {
            team_id: team,
            score: self.score(team),
        })
    }

    pub fn player(&self, user_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn player_at(&self, seat: Seat) -> Option<&Player> {
        self.players.iter().find(|p| p.slot == seat)
    }

    pub fn seat_of(&self, user_id: &str) -> Result<Seat, DomainError> {
        self.player(user_id).map(|p| p.slot).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NotAPlayer,
                format!("User {user_id} is not a player in session {}", self.id),
            )
        })
    }

    fn ensure_not_ended(&self) -> Result<(), DomainError> {
        if self.status == SessionStatus::GameEnded {
            return Err(DomainError::validation(
                ValidationKind::GameEnded,
                format!("Session {} has ended", self.id),
            ));
        }
        Ok(())
    }

    fn phase_mismatch(&self, wanted: &str) -> DomainError {
        DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!(
                "Session {} is {}, expected {wanted}",
                self.id,
                self.status.as_str()
            ),
        )
    }

    /// Seat a user on `team`, taking the team's lower free seat.
    pub fn join(&mut self, user_id: &str, team: Team) -> Result<Player, DomainError> {
        self.ensure_not_ended()?;
        if self.status != SessionStatus::Waiting {
            return Err(self.phase_mismatch("waiting"));
        }
        if self.players.len() >= SEATS {
            return Err(DomainError::validation(
                ValidationKind::SessionFull,
                "Session is full. Maximum 4 players allowed.",
            ));
        }
        if self.player(user_id).is_some() {
            return Err(DomainError::validation(
                ValidationKind::AlreadyJoined,
                format!("User {user_id} already joined"),
            ));
        }
        let slot = team
            .seats()
            .into_iter()
            .find(|seat| self.player_at(*seat).is_none())
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::TeamFull,
                    format!("Team {team} is full. Maximum 2 players per team."),
                )
            })?;

        let player = Player {
            user_id: user_id.to_owned(),
            team,
            slot,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    /// Creator-only; needs a full table.
    pub fn start_game(&mut self, user_id: &str) -> Result<(), DomainError> {
        self.ensure_not_ended()?;
        if self.status != SessionStatus::Waiting {
            return Err(self.phase_mismatch("waiting"));
        }
        if self.created_by != user_id {
            return Err(DomainError::validation(
                ValidationKind::NotCreator,
                "Only the session creator can start the game",
            ));
        }
        if self.players.len() != SEATS {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                "Game can only be started when session has 4 players",
            ));
        }
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Open the next round. Returns `(round_no, caller_seat)`.
    pub fn begin_round(&mut self, user_id: &str) -> Result<(u32, Seat), DomainError> {
        self.ensure_not_ended()?;
        let seat = self.seat_of(user_id)?;
        if !matches!(
            self.status,
            SessionStatus::Active | SessionStatus::RoundEnded
        ) {
            return Err(self.phase_mismatch("active or active:round_ended"));
        }
        if seat != self.current_active_slot {
            return Err(DomainError::validation(
                ValidationKind::NotCaller,
                format!(
                    "Only seat {} can start this round",
                    self.current_active_slot
                ),
            ));
        }
        self.current_round_no += 1;
        self.status = SessionStatus::SelectTrickSuit;
        Ok((self.current_round_no, self.current_active_slot))
    }

    /// Caller check for trump selection; the round enforces the rest.
    pub fn ensure_trick_suit_phase(&self, user_id: &str) -> Result<Seat, DomainError> {
        self.ensure_not_ended()?;
        let seat = self.seat_of(user_id)?;
        match self.status {
            SessionStatus::SelectTrickSuit => Ok(seat),
            // Trump is only chosen once per round.
            SessionStatus::GamePlay => Err(DomainError::validation(
                ValidationKind::TrickSuitAlreadySelected,
                format!(
                    "Trick suit already selected for round {}",
                    self.current_round_no
                ),
            )),
            _ => Err(self.phase_mismatch("active:select_trick_suit")),
        }
    }

    pub fn trick_suit_selected(&mut self) {
        self.status = SessionStatus::GamePlay;
    }

    pub fn ensure_game_play(&self, user_id: &str) -> Result<Seat, DomainError> {
        self.ensure_not_ended()?;
        let seat = self.seat_of(user_id)?;
        if self.status != SessionStatus::GamePlay {
            return Err(self.phase_mismatch("active:game_play"));
        }
        Ok(seat)
    }

    /// Apply a finished round: scores, tie memory, caller rotation, game end.
    pub fn apply_settlement(
        &mut self,
        settlement: RoundSettlement,
        rules: &GameRules,
    ) -> SettlementApplied {
        if settlement.tied {
            self.last_round_tied = true;
        } else {
            if let Some(loser) = settlement.loser {
                let deduction = i32::from(settlement.deduction);
                match loser {
                    Team::Red => self.red_score -= deduction,
                    Team::Black => self.black_score -= deduction,
                }
            }
            self.last_round_winner = settlement.winner;
            self.last_round_tied = false;
        }
        self.current_active_slot = next_seat(self.current_active_slot);

        let beaten = Team::BOTH
            .into_iter()
            .find(|team| self.score(*team) <= rules.losing_score);
        match beaten {
            Some(team) => {
                self.winner = Some(team.opponent());
                self.status = SessionStatus::GameEnded;
            }
            None => self.status = SessionStatus::RoundEnded,
        }

        SettlementApplied {
            settlement,
            next_active_slot: self.current_active_slot,
            game_winner: self.winner,
        }
    }
}
