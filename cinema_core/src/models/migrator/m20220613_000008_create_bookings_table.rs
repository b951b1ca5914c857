use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000002_create_users_table::User;
use super::m20220613_000007_create_shows_table::Show;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .col(pk_auto(Booking::Id))
                    .col(integer(Booking::NumberOfSeat))
                    .col(timestamp(Booking::Time))
                    .col(
                        ColumnDef::new(Booking::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(integer(Booking::UserId))
                    .col(integer(Booking::ShowId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user_id")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_show_id")
                            .from(Booking::Table, Booking::ShowId)
                            .to(Show::Table, Show::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_show_id")
                    .table(Booking::Table)
                    .col(Booking::ShowId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_id")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    #[sea_orm(iden = "bookings")]
    Table,
    Id,
    NumberOfSeat,
    Time,
    Status,
    UserId,
    ShowId,
}
