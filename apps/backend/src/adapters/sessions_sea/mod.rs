//! SeaORM adapter for sessions and their seated players - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{session_players, sessions};
use crate::infra::db_errors::{optimistic_lock_err, SESSION_NOT_FOUND_PREFIX};

pub mod dto;

pub use dto::{PlayerCreate, SessionCreate, SessionUpdate};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

fn session_not_found(id: &str) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("{SESSION_NOT_FOUND_PREFIX}{id}"))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<sessions::Model>, sea_orm::DbErr> {
    sessions::Entity::find_by_id(session_id.to_owned())
        .one(conn)
        .await
}

/// Find session by id or return a structured not-found error.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<sessions::Model, sea_orm::DbErr> {
    find_by_id(conn, session_id)
        .await?
        .ok_or_else(|| session_not_found(session_id))
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionCreate,
) -> Result<sessions::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let session = sessions::ActiveModel {
        id: Set(dto.id),
        status: Set("waiting".to_owned()),
        created_by: Set(dto.created_by),
        current_active_slot: Set(0),
        current_round_no: Set(0),
        red_score: Set(dto.starting_score),
        black_score: Set(dto.starting_score),
        last_round_tied: Set(false),
        last_round_winner: Set(None),
        winner: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        lock_version: Set(1),
    };
    session.insert(conn).await
}

/// Conditional full-row update; bumps `lock_version` on success.
pub async fn update_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionUpdate,
) -> Result<sessions::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let result = sessions::Entity::update_many()
        .col_expr(sessions::Column::Status, Expr::val(dto.status).into())
        .col_expr(
            sessions::Column::CurrentActiveSlot,
            Expr::val(dto.current_active_slot).into(),
        )
        .col_expr(
            sessions::Column::CurrentRoundNo,
            Expr::val(dto.current_round_no).into(),
        )
        .col_expr(sessions::Column::RedScore, Expr::val(dto.red_score).into())
        .col_expr(sessions::Column::BlackScore, Expr::val(dto.black_score).into())
        .col_expr(
            sessions::Column::LastRoundTied,
            Expr::val(dto.last_round_tied).into(),
        )
        .col_expr(
            sessions::Column::LastRoundWinner,
            Expr::val(dto.last_round_winner).into(),
        )
        .col_expr(sessions::Column::Winner, Expr::val(dto.winner).into())
        .col_expr(sessions::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            sessions::Column::LockVersion,
            Expr::col(sessions::Column::LockVersion).add(1),
        )
        .filter(sessions::Column::Id.eq(dto.id.as_str()))
        .filter(sessions::Column::LockVersion.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        // Distinguish a missing row from a stale version.
        let current = require_session(conn, &dto.id).await?;
        return Err(optimistic_lock_err(
            "session",
            dto.expected_version,
            current.lock_version,
        ));
    }

    require_session(conn, &dto.id).await
}

/// Seated players in seat order.
pub async fn list_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<session_players::Model>, sea_orm::DbErr> {
    session_players::Entity::find()
        .filter(session_players::Column::SessionId.eq(session_id))
        .order_by_asc(session_players::Column::Slot)
        .all(conn)
        .await
}

pub async fn insert_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<session_players::Model, sea_orm::DbErr> {
    let player = session_players::ActiveModel {
        id: NotSet,
        session_id: Set(dto.session_id),
        user_id: Set(dto.user_id),
        team: Set(dto.team),
        slot: Set(dto.slot),
        joined_at: Set(time::OffsetDateTime::now_utc()),
    };
    player.insert(conn).await
}
