use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000008_create_bookings_table::Booking;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .col(pk_auto(Payment::Id))
                    .col(double(Payment::Amount))
                    .col(timestamp(Payment::Date))
                    .col(ColumnDef::new(Payment::Discount).double().not_null().default(0.0))
                    .col(uuid_uniq(Payment::TransactionId))
                    .col(ColumnDef::new(Payment::PaymentMethod).string_len(16).not_null())
                    .col(integer(Payment::BookingId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_booking_id")
                            .from(Payment::Table, Payment::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_booking_id")
                    .table(Payment::Table)
                    .col(Payment::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payment {
    #[sea_orm(iden = "payments")]
    Table,
    Id,
    Amount,
    Date,
    Discount,
    TransactionId,
    PaymentMethod,
    BookingId,
}
