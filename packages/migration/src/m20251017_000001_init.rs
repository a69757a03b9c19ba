use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Status,
    CreatedBy,
    CurrentActiveSlot,
    CurrentRoundNo,
    RedScore,
    BlackScore,
    LastRoundTied,
    LastRoundWinner,
    Winner,
    CreatedAt,
    UpdatedAt,
    LockVersion,
}

#[derive(Iden)]
enum SessionPlayers {
    Table,
    Id,
    SessionId,
    UserId,
    Team,
    Slot,
    JoinedAt,
}

#[derive(Iden)]
enum Rounds {
    Table,
    Id,
    SessionId,
    RoundNo,
    Seed,
    CallerSlot,
    Status,
    Hands,
    TrickSuit,
    CurrentSuit,
    MoveNo,
    MoveActiveSlot,
    MoveCurrentSlot,
    CurrentMove,
    RedMoveWins,
    BlackMoveWins,
    CreatedAt,
    UpdatedAt,
    LockVersion,
}

#[derive(Iden)]
enum MoveRecords {
    Table,
    Id,
    RoundId,
    MoveNo,
    Suit,
    PlayedCards,
    WonBy,
    WonBySlot,
    CreatedAt,
    UpdatedAt,
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // sessions
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).string_len(32).not_null().primary_key())
                    .col(
                        ColumnDef::new(Sessions::Status)
                            .string_len(32)
                            .not_null()
                            .default("waiting"),
                    )
                    .col(ColumnDef::new(Sessions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Sessions::CurrentActiveSlot)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sessions::CurrentRoundNo)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sessions::RedScore).integer().not_null())
                    .col(ColumnDef::new(Sessions::BlackScore).integer().not_null())
                    .col(
                        ColumnDef::new(Sessions::LastRoundTied)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Sessions::LastRoundWinner).string_len(16).null())
                    .col(ColumnDef::new(Sessions::Winner).string_len(16).null())
                    .col(timestamp(Sessions::CreatedAt))
                    .col(timestamp(Sessions::UpdatedAt))
                    .col(
                        ColumnDef::new(Sessions::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        // session_players
        manager
            .create_table(
                Table::create()
                    .table(SessionPlayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionPlayers::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(SessionPlayers::SessionId).string_len(32).not_null())
                    .col(ColumnDef::new(SessionPlayers::UserId).string().not_null())
                    .col(ColumnDef::new(SessionPlayers::Team).string_len(16).not_null())
                    .col(ColumnDef::new(SessionPlayers::Slot).small_integer().not_null())
                    .col(timestamp(SessionPlayers::JoinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_players_session_id")
                            .from(SessionPlayers::Table, SessionPlayers::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A seat is taken once; a user sits once.
        manager
            .create_index(
                Index::create()
                    .name("ux_session_players_session_slot")
                    .table(SessionPlayers::Table)
                    .col(SessionPlayers::SessionId)
                    .col(SessionPlayers::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_session_players_session_user")
                    .table(SessionPlayers::Table)
                    .col(SessionPlayers::SessionId)
                    .col(SessionPlayers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // rounds
        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rounds::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Rounds::SessionId).string_len(32).not_null())
                    .col(ColumnDef::new(Rounds::RoundNo).integer().not_null())
                    .col(ColumnDef::new(Rounds::Seed).big_integer().not_null())
                    .col(ColumnDef::new(Rounds::CallerSlot).small_integer().not_null())
                    .col(
                        ColumnDef::new(Rounds::Status)
                            .string_len(32)
                            .not_null()
                            .default("waiting_for_trick_suit"),
                    )
                    .col(ColumnDef::new(Rounds::Hands).json_binary().not_null())
                    .col(ColumnDef::new(Rounds::TrickSuit).string_len(16).null())
                    .col(ColumnDef::new(Rounds::CurrentSuit).string_len(16).null())
                    .col(ColumnDef::new(Rounds::MoveNo).small_integer().not_null().default(1))
                    .col(ColumnDef::new(Rounds::MoveActiveSlot).small_integer().not_null())
                    .col(ColumnDef::new(Rounds::MoveCurrentSlot).small_integer().not_null())
                    .col(ColumnDef::new(Rounds::CurrentMove).json_binary().not_null())
                    .col(
                        ColumnDef::new(Rounds::RedMoveWins)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rounds::BlackMoveWins)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Rounds::CreatedAt))
                    .col(timestamp(Rounds::UpdatedAt))
                    .col(
                        ColumnDef::new(Rounds::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_session_id")
                            .from(Rounds::Table, Rounds::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_rounds_session_round_no")
                    .table(Rounds::Table)
                    .col(Rounds::SessionId)
                    .col(Rounds::RoundNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // move_records
        manager
            .create_table(
                Table::create()
                    .table(MoveRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MoveRecords::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(MoveRecords::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(MoveRecords::MoveNo).small_integer().not_null())
                    .col(ColumnDef::new(MoveRecords::Suit).string_len(16).null())
                    .col(ColumnDef::new(MoveRecords::PlayedCards).json_binary().not_null())
                    .col(ColumnDef::new(MoveRecords::WonBy).string_len(16).null())
                    .col(ColumnDef::new(MoveRecords::WonBySlot).small_integer().null())
                    .col(timestamp(MoveRecords::CreatedAt))
                    .col(timestamp(MoveRecords::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_move_records_round_id")
                            .from(MoveRecords::Table, MoveRecords::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_move_records_round_move")
                    .table(MoveRecords::Table)
                    .col(MoveRecords::RoundId)
                    .col(MoveRecords::MoveNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order; indexes go with their tables
        manager
            .drop_table(Table::drop().table(MoveRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rounds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionPlayers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
