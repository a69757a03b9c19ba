//! DTOs for rounds_sea adapter.

use sea_orm::prelude::Json;

/// Column values shared by insert and update.
#[derive(Debug, Clone)]
pub struct RoundFields {
    pub status: String,
    pub hands: Json,
    pub trick_suit: Option<String>,
    pub current_suit: Option<String>,
    pub move_no: i16,
    pub move_active_slot: i16,
    pub move_current_slot: i16,
    pub current_move: Json,
    pub red_move_wins: i16,
    pub black_move_wins: i16,
}

#[derive(Debug, Clone)]
pub struct RoundCreate {
    pub session_id: String,
    pub round_no: i32,
    pub seed: i64,
    pub caller_slot: i16,
    pub fields: RoundFields,
}

#[derive(Debug, Clone)]
pub struct RoundUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub fields: RoundFields,
}
