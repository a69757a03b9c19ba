//! Session repository functions for domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::sessions_sea as sessions_adapter;
use crate::domain::seats::require_seat;
use crate::domain::{Player, SessionState, SessionStatus, Team};
use crate::entities::{session_players, sessions};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// A session as loaded, with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub state: SessionState,
    pub lock_version: i32,
    pub created_at: time::OffsetDateTime,
}

fn parse_team(raw: &str) -> Result<Team, DomainError> {
    raw.parse::<Team>().map_err(|_| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("Unknown team '{raw}' in storage"),
        )
    })
}

fn to_domain(
    model: sessions::Model,
    players: Vec<session_players::Model>,
) -> Result<StoredSession, DomainError> {
    let players = players
        .into_iter()
        .map(|p| {
            Ok(Player {
                team: parse_team(&p.team)?,
                slot: require_seat(i64::from(p.slot))?,
                user_id: p.user_id,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    let state = SessionState {
        status: SessionStatus::parse(&model.status)?,
        current_active_slot: require_seat(i64::from(model.current_active_slot))?,
        current_round_no: u32::try_from(model.current_round_no).map_err(|_| {
            DomainError::infra(InfraErrorKind::DataCorruption, "Negative round number")
        })?,
        red_score: model.red_score,
        black_score: model.black_score,
        last_round_tied: model.last_round_tied,
        last_round_winner: model.last_round_winner.as_deref().map(parse_team).transpose()?,
        winner: model.winner.as_deref().map(parse_team).transpose()?,
        created_by: model.created_by,
        id: model.id,
        players,
    };

    Ok(StoredSession {
        state,
        lock_version: model.lock_version,
        created_at: model.created_at,
    })
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<StoredSession>, DomainError> {
    let Some(model) = sessions_adapter::find_by_id(conn, session_id).await? else {
        return Ok(None);
    };
    let players = sessions_adapter::list_players(conn, session_id).await?;
    to_domain(model, players).map(Some)
}

/// Load a session or fail with `NotFound(Session)`.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<StoredSession, DomainError> {
    let model = sessions_adapter::require_session(conn, session_id).await?;
    let players = sessions_adapter::list_players(conn, session_id).await?;
    to_domain(model, players)
}

/// Insert a fresh session together with its creator's seat.
pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &SessionState,
    starting_score: i32,
) -> Result<StoredSession, DomainError> {
    sessions_adapter::create_session(
        conn,
        sessions_adapter::SessionCreate {
            id: state.id.clone(),
            created_by: state.created_by.clone(),
            starting_score,
        },
    )
    .await?;
    for player in &state.players {
        add_player(conn, &state.id, player).await?;
    }
    require_session(conn, &state.id).await
}

pub async fn add_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    player: &Player,
) -> Result<(), DomainError> {
    sessions_adapter::insert_player(
        conn,
        sessions_adapter::PlayerCreate {
            session_id: session_id.to_owned(),
            user_id: player.user_id.clone(),
            team: player.team.as_str().to_owned(),
            slot: i16::from(player.slot),
        },
    )
    .await?;
    Ok(())
}

/// Persist `state` if the stored row is still at `expected_version`.
/// Returns the new version.
pub async fn save_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &SessionState,
    expected_version: i32,
) -> Result<i32, DomainError> {
    let updated = sessions_adapter::update_session(
        conn,
        sessions_adapter::SessionUpdate {
            id: state.id.clone(),
            expected_version,
            status: state.status.as_str().to_owned(),
            current_active_slot: i16::from(state.current_active_slot),
            current_round_no: i32::try_from(state.current_round_no).map_err(|_| {
                DomainError::infra(InfraErrorKind::Other("Overflow".into()), "Round number overflow")
            })?,
            red_score: state.red_score,
            black_score: state.black_score,
            last_round_tied: state.last_round_tied,
            last_round_winner: state.last_round_winner.map(|t| t.as_str().to_owned()),
            winner: state.winner.map(|t| t.as_str().to_owned()),
        },
    )
    .await?;
    Ok(updated.lock_version)
}
