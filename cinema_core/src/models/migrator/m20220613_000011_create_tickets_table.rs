use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000002_create_users_table::User;
use super::m20220613_000007_create_shows_table::Show;
use super::m20220613_000008_create_bookings_table::Booking;
use super::m20220613_000009_create_show_seat_table::ShowSeat;
use super::m20220613_000010_create_payments_table::Payment;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .col(pk_auto(Ticket::Id))
                    .col(integer(Ticket::ShowId))
                    .col(integer(Ticket::PaymentId))
                    .col(integer(Ticket::BookingId))
                    .col(integer(Ticket::UserId))
                    .col(integer(Ticket::ShowSeatId))
                    .col(timestamp(Ticket::Date))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_show_id")
                            .from(Ticket::Table, Ticket::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_payment_id")
                            .from(Ticket::Table, Ticket::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_booking_id")
                            .from(Ticket::Table, Ticket::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_user_id")
                            .from(Ticket::Table, Ticket::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_show_seat_id")
                            .from(Ticket::Table, Ticket::ShowSeatId)
                            .to(ShowSeat::Table, ShowSeat::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_booking_id")
                    .table(Ticket::Table)
                    .col(Ticket::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    #[sea_orm(iden = "tickets")]
    Table,
    Id,
    ShowId,
    PaymentId,
    BookingId,
    UserId,
    ShowSeatId,
    Date,
}
