use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000006_create_showroom_seat_table::ShowroomSeat;
use super::m20220613_000007_create_shows_table::Show;
use super::m20220613_000008_create_bookings_table::Booking;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // Per-show, per-seat bookable unit. `booking_id` is NULL until the seat is reserved.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShowSeat::Table)
                    .col(pk_auto(ShowSeat::Id))
                    .col(
                        ColumnDef::new(ShowSeat::Status)
                            .string_len(16)
                            .not_null()
                            .default("available"),
                    )
                    .col(double(ShowSeat::Price))
                    .col(integer(ShowSeat::ShowroomSeatId))
                    .col(integer(ShowSeat::ShowId))
                    .col(integer_null(ShowSeat::BookingId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_seat_showroom_seat_id")
                            .from(ShowSeat::Table, ShowSeat::ShowroomSeatId)
                            .to(ShowroomSeat::Table, ShowroomSeat::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_seat_show_id")
                            .from(ShowSeat::Table, ShowSeat::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_seat_booking_id")
                            .from(ShowSeat::Table, ShowSeat::BookingId)
                            .to(Booking::Table, Booking::Id)
                            // Seat inventory outlives the booking that held it
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One bookable unit per physical seat per show
        manager
            .create_index(
                Index::create()
                    .name("idx_show_seat_show_seat_unique")
                    .table(ShowSeat::Table)
                    .col(ShowSeat::ShowId)
                    .col(ShowSeat::ShowroomSeatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_seat_show_status")
                    .table(ShowSeat::Table)
                    .col(ShowSeat::ShowId)
                    .col(ShowSeat::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_seat_booking_id")
                    .table(ShowSeat::Table)
                    .col(ShowSeat::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShowSeat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShowSeat {
    Table,
    Id,
    Status,
    Price,
    ShowroomSeatId,
    ShowId,
    BookingId,
}
