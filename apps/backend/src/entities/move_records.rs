use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "move_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "round_id")]
    pub round_id: i64,
    #[sea_orm(column_name = "move_no", column_type = "SmallInteger")]
    pub move_no: i16,
    /// Suit of the first card played.
    pub suit: Option<String>,
    #[sea_orm(column_name = "played_cards")]
    pub played_cards: Json,
    /// Set once the fourth card lands; the row is sealed after that.
    #[sea_orm(column_name = "won_by")]
    pub won_by: Option<String>,
    #[sea_orm(column_name = "won_by_slot", column_type = "SmallInteger", nullable)]
    pub won_by_slot: Option<i16>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id"
    )]
    Round,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
