//! SeaORM adapter for rounds - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};

use crate::entities::rounds;
use crate::infra::db_errors::optimistic_lock_err;

pub mod dto;

pub use dto::{RoundCreate, RoundFields, RoundUpdate};

pub async fn find_by_session_and_no<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round_no: i32,
) -> Result<Option<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::SessionId.eq(session_id))
        .filter(rounds::Column::RoundNo.eq(round_no))
        .one(conn)
        .await
}

pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundCreate,
) -> Result<rounds::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let fields = dto.fields;
    let round = rounds::ActiveModel {
        id: NotSet,
        session_id: Set(dto.session_id),
        round_no: Set(dto.round_no),
        seed: Set(dto.seed),
        caller_slot: Set(dto.caller_slot),
        status: Set(fields.status),
        hands: Set(fields.hands),
        trick_suit: Set(fields.trick_suit),
        current_suit: Set(fields.current_suit),
        move_no: Set(fields.move_no),
        move_active_slot: Set(fields.move_active_slot),
        move_current_slot: Set(fields.move_current_slot),
        current_move: Set(fields.current_move),
        red_move_wins: Set(fields.red_move_wins),
        black_move_wins: Set(fields.black_move_wins),
        created_at: Set(now),
        updated_at: Set(now),
        lock_version: Set(1),
    };
    round.insert(conn).await
}

/// Conditional update of the mutable round columns; bumps `lock_version`.
pub async fn update_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundUpdate,
) -> Result<rounds::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let fields = dto.fields;

    let result = rounds::Entity::update_many()
        .col_expr(rounds::Column::Status, Expr::val(fields.status).into())
        .col_expr(rounds::Column::Hands, Expr::val(fields.hands).into())
        .col_expr(rounds::Column::TrickSuit, Expr::val(fields.trick_suit).into())
        .col_expr(rounds::Column::CurrentSuit, Expr::val(fields.current_suit).into())
        .col_expr(rounds::Column::MoveNo, Expr::val(fields.move_no).into())
        .col_expr(
            rounds::Column::MoveActiveSlot,
            Expr::val(fields.move_active_slot).into(),
        )
        .col_expr(
            rounds::Column::MoveCurrentSlot,
            Expr::val(fields.move_current_slot).into(),
        )
        .col_expr(rounds::Column::CurrentMove, Expr::val(fields.current_move).into())
        .col_expr(rounds::Column::RedMoveWins, Expr::val(fields.red_move_wins).into())
        .col_expr(
            rounds::Column::BlackMoveWins,
            Expr::val(fields.black_move_wins).into(),
        )
        .col_expr(rounds::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            rounds::Column::LockVersion,
            Expr::col(rounds::Column::LockVersion).add(1),
        )
        .filter(rounds::Column::Id.eq(dto.id))
        .filter(rounds::Column::LockVersion.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let current = rounds::Entity::find_by_id(dto.id)
            .one(conn)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Round not found".to_owned()))?;
        return Err(optimistic_lock_err(
            "round",
            dto.expected_version,
            current.lock_version,
        ));
    }

    rounds::Entity::find_by_id(dto.id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Round not found".to_owned()))
}
