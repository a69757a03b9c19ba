//! DTOs for sessions_sea adapter.

/// DTO for creating a new session row.
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub id: String,
    pub created_by: String,
    pub starting_score: i32,
}

/// Full-row update guarded by `expected_version`.
///
/// Every mutable column is written; the row only changes if its
/// `lock_version` still equals `expected_version`.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub id: String,
    pub expected_version: i32,
    pub status: String,
    pub current_active_slot: i16,
    pub current_round_no: i32,
    pub red_score: i32,
    pub black_score: i32,
    pub last_round_tied: bool,
    pub last_round_winner: Option<String>,
    pub winner: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlayerCreate {
    pub session_id: String,
    pub user_id: String,
    pub team: String,
    pub slot: i16,
}
