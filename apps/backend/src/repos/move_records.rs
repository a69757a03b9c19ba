//! Move record repository: write-once audit trail of each move.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::move_records_sea as move_records_adapter;
use crate::domain::{MovePlay, Seat, Team};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Audit view of one move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub move_no: u8,
    pub suit: Option<String>,
    pub played_cards: Vec<MovePlay>,
    pub won_by: Option<Team>,
    pub won_by_slot: Option<Seat>,
}

/// Record the plays of move `move_no` so far, sealing it when `winner` is given.
///
/// The first card creates the row; later cards update it while it is open.
pub async fn record_move<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    move_no: u8,
    plays: &[MovePlay],
    winner: Option<MovePlay>,
) -> Result<(), DomainError> {
    let played_cards = serde_json::to_value(plays).map_err(|e| {
        DomainError::infra(InfraErrorKind::Other("Serialize".into()), e.to_string())
    })?;
    let write = move_records_adapter::MoveRecordWrite {
        round_id,
        move_no: i16::from(move_no),
        suit: plays.first().map(|p| p.card.suit().as_str().to_owned()),
        played_cards,
        won_by: winner.map(|w| Team::for_seat(w.slot).as_str().to_owned()),
        won_by_slot: winner.map(|w| i16::from(w.slot)),
    };

    if plays.len() <= 1 {
        move_records_adapter::insert(conn, write).await?;
    } else {
        move_records_adapter::update_open(conn, write).await?;
    }
    Ok(())
}

pub async fn list_for_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<MoveRecord>, DomainError> {
    let models = move_records_adapter::list_for_round(conn, round_id).await?;
    models
        .into_iter()
        .map(|m| {
            let corrupt = |detail: String| DomainError::infra(InfraErrorKind::DataCorruption, detail);
            Ok(MoveRecord {
                move_no: u8::try_from(m.move_no)
                    .map_err(|_| corrupt(format!("move_no {} out of range", m.move_no)))?,
                suit: m.suit,
                played_cards: serde_json::from_value(m.played_cards)
                    .map_err(|e| corrupt(format!("Unreadable move record: {e}")))?,
                won_by: m
                    .won_by
                    .as_deref()
                    .map(|t| t.parse::<Team>())
                    .transpose()?,
                won_by_slot: m.won_by_slot.and_then(|s| u8::try_from(s).ok()),
            })
        })
        .collect()
}
