//! Websocket wire format: `{action, body}` envelopes in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::domain::session::TeamScore;
use crate::domain::{Card, CardFace, MovePlay, Seat, SessionStatus, Suit, Team};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;

/// Inbound actions. Anything else is answered with `UNKNOWN_ACTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMsg {
    GameStart,
    RoundStart,
    TrickSuitSelect { trick_suit: Suit },
    PlayCard { played_card: Card },
    Health,
}

/// A parsed inbound frame. `expected_version` pins the session version the
/// client acted on; a stale pin is rejected instead of retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound {
    pub msg: ClientMsg,
    pub expected_version: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    action: String,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    expected_version: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrickSuitBody {
    trick_suit: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayCardBody {
    played_card: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Malformed(String),
    UnknownAction(String),
    Invalid(DomainError),
}

impl ParseError {
    pub fn into_server_msg(self) -> ServerMsg {
        match self {
            ParseError::Malformed(detail) => ServerMsg::error(ErrorCode::BadRequest, detail),
            ParseError::UnknownAction(action) => {
                ServerMsg::error(ErrorCode::UnknownAction, format!("Unknown action '{action}'"))
            }
            ParseError::Invalid(err) => ServerMsg::from(&AppError::from(err)),
        }
    }
}

fn body<T: for<'de> Deserialize<'de>>(action: &str, body: Option<Value>) -> Result<T, ParseError> {
    let body = body.ok_or_else(|| ParseError::Malformed(format!("{action} requires a body")))?;
    serde_json::from_value(body).map_err(|e| ParseError::Malformed(format!("{action}: {e}")))
}

impl Inbound {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let env: Envelope =
            serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let msg = match env.action.as_str() {
            "GAME_START" => ClientMsg::GameStart,
            "ROUND_START" => ClientMsg::RoundStart,
            "HEALTH" => ClientMsg::Health,
            "TRICK_SUIT_SELECT" => {
                let b: TrickSuitBody = body("TRICK_SUIT_SELECT", env.body)?;
                let trick_suit = b.trick_suit.parse::<Suit>().map_err(ParseError::Invalid)?;
                ClientMsg::TrickSuitSelect { trick_suit }
            }
            "PLAY_CARD" => {
                let b: PlayCardBody = body("PLAY_CARD", env.body)?;
                let played_card = Card::try_from(b.played_card).map_err(ParseError::Invalid)?;
                ClientMsg::PlayCard { played_card }
            }
            other => return Err(ParseError::UnknownAction(other.to_owned())),
        };

        Ok(Self {
            msg,
            expected_version: env.expected_version,
        })
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

pub fn round_id(session_id: &str, round_no: u32) -> String {
    format!("{session_id}_round_{round_no}")
}

/// Outbound notifications and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "action",
    content = "body",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: String,
        team: Team,
        slot: Seat,
        session_id: String,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        session_id: String,
        started_by: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    GameStartSuccess {
        message: String,
        session_id: String,
        status: SessionStatus,
    },
    #[serde(rename_all = "camelCase")]
    RoundStart {
        round_id: String,
        session_id: String,
        current_round: u32,
        active_slot: Seat,
        session_status: SessionStatus,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    ReceiveCardSet {
        round_id: String,
        session_id: String,
        player_slot: Seat,
        cards: Vec<CardFace>,
        is_first_set: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        trick_suit: Option<Suit>,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    TrickSuitSelected {
        round_id: String,
        session_id: String,
        trick_suit: Suit,
        selected_by_slot: Seat,
        session_status: SessionStatus,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    CardPlayed {
        card: CardFace,
        slot: Seat,
        current_move: u8,
        move_cards: Vec<MovePlay>,
        is_first_move: bool,
        is_last_move: bool,
        session_status: SessionStatus,
    },
    #[serde(rename_all = "camelCase")]
    MoveWon {
        r#move: u8,
        won_by_team: Team,
        won_by_slot: Seat,
        session_status: SessionStatus,
    },
    #[serde(rename_all = "camelCase")]
    RoundWon {
        round: u32,
        active_slot: Seat,
        round_lost_team: Option<Team>,
        round_won_team: Option<Team>,
        is_round_tied: bool,
        teams: [TeamScore; 2],
        session_status: SessionStatus,
    },
    #[serde(rename_all = "camelCase")]
    GameEnded {
        session_id: String,
        winner: Team,
        teams: [TeamScore; 2],
        session_status: SessionStatus,
    },
    Health {
        timestamp: i64,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMsg {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMsg::Error {
            code,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self)
            .map_err(|e| AppError::internal(format!("failed to serialize outbound message: {e}")))
    }

    pub fn action(&self) -> &'static str {
        match self {
            ServerMsg::UserJoined { .. } => "USER_JOINED",
            ServerMsg::GameStarted { .. } => "GAME_STARTED",
            ServerMsg::GameStartSuccess { .. } => "GAME_START_SUCCESS",
            ServerMsg::RoundStart { .. } => "ROUND_START",
            ServerMsg::ReceiveCardSet { .. } => "RECEIVE_CARD_SET",
            ServerMsg::TrickSuitSelected { .. } => "TRICK_SUIT_SELECTED",
            ServerMsg::CardPlayed { .. } => "CARD_PLAYED",
            ServerMsg::MoveWon { .. } => "MOVE_WON",
            ServerMsg::RoundWon { .. } => "ROUND_WON",
            ServerMsg::GameEnded { .. } => "GAME_ENDED",
            ServerMsg::Health { .. } => "HEALTH",
            ServerMsg::Error { .. } => "ERROR",
        }
    }
}

impl From<&AppError> for ServerMsg {
    fn from(err: &AppError) -> Self {
        ServerMsg::error(err.code(), err.detail())
    }
}
