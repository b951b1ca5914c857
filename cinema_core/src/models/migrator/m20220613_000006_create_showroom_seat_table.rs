use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000005_create_showrooms_table::Showroom;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // The physical seating of a showroom. Configured once, shared by every show.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShowroomSeat::Table)
                    .col(pk_auto(ShowroomSeat::Id))
                    .col(integer(ShowroomSeat::SeatNumber))
                    .col(
                        ColumnDef::new(ShowroomSeat::SeatType)
                            .string_len(16)
                            .not_null()
                            .default("standard"),
                    )
                    .col(integer(ShowroomSeat::ShowroomId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showroom_seat_showroom_id")
                            .from(ShowroomSeat::Table, ShowroomSeat::ShowroomId)
                            .to(Showroom::Table, Showroom::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A seat number exists once per showroom
        manager
            .create_index(
                Index::create()
                    .name("idx_showroom_seat_showroom_number_unique")
                    .table(ShowroomSeat::Table)
                    .col(ShowroomSeat::ShowroomId)
                    .col(ShowroomSeat::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShowroomSeat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShowroomSeat {
    Table,
    Id,
    SeatNumber,
    SeatType,
    ShowroomId,
}
