//! Round repository functions for domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::rounds_sea as rounds_adapter;
use crate::domain::seats::require_seat;
use crate::domain::{Card, MovePlay, MoveWins, RoundState, RoundStatus, Suit, SEATS};
use crate::entities::rounds;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRound {
    pub id: i64,
    pub state: RoundState,
    pub lock_version: i32,
}

fn corrupt(detail: impl Into<String>) -> DomainError {
    DomainError::infra(InfraErrorKind::DataCorruption, detail)
}

fn parse_suit(raw: Option<&str>) -> Result<Option<Suit>, DomainError> {
    raw.map(|s| s.parse::<Suit>().map_err(|_| corrupt(format!("Unknown suit '{s}'"))))
        .transpose()
}

fn small(value: i16, what: &str) -> Result<u8, DomainError> {
    u8::try_from(value).map_err(|_| corrupt(format!("{what} out of range: {value}")))
}

fn to_domain(model: rounds::Model) -> Result<StoredRound, DomainError> {
    let hands: [Vec<Card>; SEATS] = serde_json::from_value(model.hands)
        .map_err(|e| corrupt(format!("Unreadable hands for round {}: {e}", model.id)))?;
    let current_move: Vec<MovePlay> = serde_json::from_value(model.current_move)
        .map_err(|e| corrupt(format!("Unreadable move for round {}: {e}", model.id)))?;

    let state = RoundState {
        round_no: u32::try_from(model.round_no).map_err(|_| corrupt("Negative round number"))?,
        seed: u32::try_from(model.seed).map_err(|_| corrupt("Seed outside u32"))?,
        caller_slot: require_seat(i64::from(model.caller_slot))?,
        status: RoundStatus::parse(&model.status)?,
        hands,
        trick_suit: parse_suit(model.trick_suit.as_deref())?,
        current_suit: parse_suit(model.current_suit.as_deref())?,
        move_no: small(model.move_no, "move_no")?,
        move_active_slot: require_seat(i64::from(model.move_active_slot))?,
        move_current_slot: require_seat(i64::from(model.move_current_slot))?,
        current_move,
        move_wins: MoveWins {
            red: small(model.red_move_wins, "red_move_wins")?,
            black: small(model.black_move_wins, "black_move_wins")?,
        },
    };

    Ok(StoredRound {
        id: model.id,
        state,
        lock_version: model.lock_version,
    })
}

fn fields(state: &RoundState) -> Result<rounds_adapter::RoundFields, DomainError> {
    let to_json = |value: serde_json::Result<serde_json::Value>| {
        value.map_err(|e| DomainError::infra(InfraErrorKind::Other("Serialize".into()), e.to_string()))
    };
    Ok(rounds_adapter::RoundFields {
        status: state.status.as_str().to_owned(),
        hands: to_json(serde_json::to_value(&state.hands))?,
        trick_suit: state.trick_suit.map(|s| s.as_str().to_owned()),
        current_suit: state.current_suit.map(|s| s.as_str().to_owned()),
        move_no: i16::from(state.move_no),
        move_active_slot: i16::from(state.move_active_slot),
        move_current_slot: i16::from(state.move_current_slot),
        current_move: to_json(serde_json::to_value(&state.current_move))?,
        red_move_wins: i16::from(state.move_wins.red),
        black_move_wins: i16::from(state.move_wins.black),
    })
}

pub async fn find_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round_no: u32,
) -> Result<Option<StoredRound>, DomainError> {
    let Ok(round_no) = i32::try_from(round_no) else {
        return Ok(None);
    };
    rounds_adapter::find_by_session_and_no(conn, session_id, round_no)
        .await?
        .map(to_domain)
        .transpose()
}

pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    state: &RoundState,
) -> Result<StoredRound, DomainError> {
    let model = rounds_adapter::create_round(
        conn,
        rounds_adapter::RoundCreate {
            session_id: session_id.to_owned(),
            round_no: i32::try_from(state.round_no).map_err(|_| corrupt("Round number overflow"))?,
            seed: i64::from(state.seed),
            caller_slot: i16::from(state.caller_slot),
            fields: fields(state)?,
        },
    )
    .await?;
    to_domain(model)
}

/// Persist `state` if the stored row is still at `expected_version`.
/// Returns the new version.
pub async fn save_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    state: &RoundState,
    expected_version: i32,
) -> Result<i32, DomainError> {
    let updated = rounds_adapter::update_round(
        conn,
        rounds_adapter::RoundUpdate {
            id: round_id,
            expected_version,
            fields: fields(state)?,
        },
    )
    .await?;
    Ok(updated.lock_version)
}
