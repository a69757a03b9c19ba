use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub status: String,
    #[sea_orm(column_name = "created_by")]
    pub created_by: String,
    #[sea_orm(column_name = "current_active_slot", column_type = "SmallInteger")]
    pub current_active_slot: i16,
    #[sea_orm(column_name = "current_round_no")]
    pub current_round_no: i32,
    #[sea_orm(column_name = "red_score")]
    pub red_score: i32,
    #[sea_orm(column_name = "black_score")]
    pub black_score: i32,
    #[sea_orm(column_name = "last_round_tied")]
    pub last_round_tied: bool,
    #[sea_orm(column_name = "last_round_winner")]
    pub last_round_winner: Option<String>,
    pub winner: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_players::Entity")]
    SessionPlayers,
    #[sea_orm(has_many = "super::rounds::Entity")]
    Rounds,
}

impl Related<super::session_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionPlayers.def()
    }
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rounds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
