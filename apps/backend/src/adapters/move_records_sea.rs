//! SeaORM adapter for per-move audit records.

use sea_orm::prelude::Json;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::move_records;
use crate::infra::db_errors::SEALED_MOVE_PREFIX;

#[derive(Debug, Clone)]
pub struct MoveRecordWrite {
    pub round_id: i64,
    pub move_no: i16,
    pub suit: Option<String>,
    pub played_cards: Json,
    pub won_by: Option<String>,
    pub won_by_slot: Option<i16>,
}

pub async fn list_for_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<move_records::Model>, sea_orm::DbErr> {
    move_records::Entity::find()
        .filter(move_records::Column::RoundId.eq(round_id))
        .order_by_asc(move_records::Column::MoveNo)
        .all(conn)
        .await
}

pub async fn insert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MoveRecordWrite,
) -> Result<move_records::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let record = move_records::ActiveModel {
        id: NotSet,
        round_id: Set(dto.round_id),
        move_no: Set(dto.move_no),
        suit: Set(dto.suit),
        played_cards: Set(dto.played_cards),
        won_by: Set(dto.won_by),
        won_by_slot: Set(dto.won_by_slot),
        created_at: Set(now),
        updated_at: Set(now),
    };
    record.insert(conn).await
}

/// Update an open record. Rows with `won_by` already set are never touched.
pub async fn update_open<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MoveRecordWrite,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = move_records::Entity::update_many()
        .col_expr(move_records::Column::PlayedCards, Expr::val(dto.played_cards).into())
        .col_expr(move_records::Column::WonBy, Expr::val(dto.won_by).into())
        .col_expr(move_records::Column::WonBySlot, Expr::val(dto.won_by_slot).into())
        .col_expr(move_records::Column::UpdatedAt, Expr::val(now).into())
        .filter(move_records::Column::RoundId.eq(dto.round_id))
        .filter(move_records::Column::MoveNo.eq(dto.move_no))
        .filter(move_records::Column::WonBy.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::Custom(format!(
            "{SEALED_MOVE_PREFIX}{}/{}",
            dto.round_id, dto.move_no
        )));
    }
    Ok(())
}
