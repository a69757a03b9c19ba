use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rounds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "session_id")]
    pub session_id: String,
    #[sea_orm(column_name = "round_no")]
    pub round_no: i32,
    pub seed: i64,
    #[sea_orm(column_name = "caller_slot", column_type = "SmallInteger")]
    pub caller_slot: i16,
    pub status: String,
    /// Remaining card ids per seat, `[[u8; n]; 4]`.
    pub hands: Json,
    #[sea_orm(column_name = "trick_suit")]
    pub trick_suit: Option<String>,
    #[sea_orm(column_name = "current_suit")]
    pub current_suit: Option<String>,
    #[sea_orm(column_name = "move_no", column_type = "SmallInteger")]
    pub move_no: i16,
    #[sea_orm(column_name = "move_active_slot", column_type = "SmallInteger")]
    pub move_active_slot: i16,
    #[sea_orm(column_name = "move_current_slot", column_type = "SmallInteger")]
    pub move_current_slot: i16,
    /// Open move as `[{slot, card}]`.
    #[sea_orm(column_name = "current_move")]
    pub current_move: Json,
    #[sea_orm(column_name = "red_move_wins", column_type = "SmallInteger")]
    pub red_move_wins: i16,
    #[sea_orm(column_name = "black_move_wins", column_type = "SmallInteger")]
    pub black_move_wins: i16,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
    #[sea_orm(has_many = "super::move_records::Entity")]
    MoveRecords,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::move_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoveRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
