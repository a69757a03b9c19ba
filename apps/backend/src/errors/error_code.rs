//! Error codes for the Omi backend.
//!
//! Every rejection sent to a client (HTTP problem details or a websocket
//! `ERROR` frame) carries one of these codes. Add new codes here; never pass
//! ad-hoc strings as error codes.

use core::fmt;

use serde::{Serialize, Serializer};

use crate::errors::domain::{ConflictKind, InfraErrorKind, NotFoundKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    Unauthorized,
    Forbidden,

    // Game rule violations
    OutOfTurn,
    CardNotInHand,
    MustFollowSuit,
    InvalidCard,
    InvalidTrickSuit,
    TrickSuitAlreadySelected,
    NotCaller,
    NotCreator,
    NotAPlayer,
    SessionFull,
    TeamFull,
    AlreadyJoined,
    NotEnoughPlayers,
    PhaseMismatch,
    InvalidSeat,
    GameEnded,
    ValidationError,

    // Protocol
    BadRequest,
    UnknownAction,

    // Resource Not Found
    SessionNotFound,
    RoundNotFound,
    ConnectionNotFound,
    NotFound,

    // Conflicts
    OptimisticLock,
    SealedMoveRecord,
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::MustFollowSuit => "MUST_FOLLOW_SUIT",
            Self::InvalidCard => "INVALID_CARD",
            Self::InvalidTrickSuit => "INVALID_TRICK_SUIT",
            Self::TrickSuitAlreadySelected => "TRICK_SUIT_ALREADY_SELECTED",
            Self::NotCaller => "NOT_CALLER",
            Self::NotCreator => "NOT_CREATOR",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::SessionFull => "SESSION_FULL",
            Self::TeamFull => "TEAM_FULL",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::GameEnded => "GAME_ENDED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::UnknownAction => "UNKNOWN_ACTION",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::ConnectionNotFound => "CONNECTION_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::SealedMoveRecord => "SEALED_MOVE_RECORD",
            Self::Conflict => "CONFLICT",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<&ValidationKind> for ErrorCode {
    fn from(kind: &ValidationKind) -> Self {
        match kind {
            ValidationKind::OutOfTurn => Self::OutOfTurn,
            ValidationKind::CardNotInHand => Self::CardNotInHand,
            ValidationKind::MustFollowSuit => Self::MustFollowSuit,
            ValidationKind::InvalidCard => Self::InvalidCard,
            ValidationKind::InvalidTrickSuit => Self::InvalidTrickSuit,
            ValidationKind::TrickSuitAlreadySelected => Self::TrickSuitAlreadySelected,
            ValidationKind::NotCaller => Self::NotCaller,
            ValidationKind::NotCreator => Self::NotCreator,
            ValidationKind::NotAPlayer => Self::NotAPlayer,
            ValidationKind::SessionFull => Self::SessionFull,
            ValidationKind::TeamFull => Self::TeamFull,
            ValidationKind::AlreadyJoined => Self::AlreadyJoined,
            ValidationKind::NotEnoughPlayers => Self::NotEnoughPlayers,
            ValidationKind::PhaseMismatch => Self::PhaseMismatch,
            ValidationKind::InvalidSeat => Self::InvalidSeat,
            ValidationKind::GameEnded => Self::GameEnded,
            ValidationKind::Other(_) => Self::ValidationError,
        }
    }
}

impl From<&NotFoundKind> for ErrorCode {
    fn from(kind: &NotFoundKind) -> Self {
        match kind {
            NotFoundKind::Session => Self::SessionNotFound,
            NotFoundKind::Round => Self::RoundNotFound,
            NotFoundKind::Connection => Self::ConnectionNotFound,
            NotFoundKind::Other(_) => Self::NotFound,
        }
    }
}

impl From<&ConflictKind> for ErrorCode {
    fn from(kind: &ConflictKind) -> Self {
        match kind {
            ConflictKind::OptimisticLock => Self::OptimisticLock,
            ConflictKind::SealedMoveRecord => Self::SealedMoveRecord,
            ConflictKind::Other(_) => Self::Conflict,
        }
    }
}

impl From<&InfraErrorKind> for ErrorCode {
    fn from(kind: &InfraErrorKind) -> Self {
        match kind {
            InfraErrorKind::Timeout => Self::DbTimeout,
            InfraErrorKind::DbUnavailable => Self::DbUnavailable,
            InfraErrorKind::DataCorruption => Self::DataCorruption,
            InfraErrorKind::Other(_) => Self::InternalError,
        }
    }
}
