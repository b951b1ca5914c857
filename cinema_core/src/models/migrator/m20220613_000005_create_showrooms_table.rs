use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000004_create_cinema_table::Cinema;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Showroom::Table)
                    .col(pk_auto(Showroom::Id))
                    .col(ColumnDef::new(Showroom::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Showroom::TotalSeats)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(integer(Showroom::CinemaId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showrooms_cinema_id")
                            .from(Showroom::Table, Showroom::CinemaId)
                            .to(Cinema::Table, Cinema::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_showrooms_cinema_id")
                    .table(Showroom::Table)
                    .col(Showroom::CinemaId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Showroom::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Showroom {
    #[sea_orm(iden = "showrooms")]
    Table,
    Id,
    Name,
    TotalSeats,
    CinemaId,
}
