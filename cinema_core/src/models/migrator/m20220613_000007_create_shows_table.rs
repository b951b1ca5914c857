use sea_orm_migration::{prelude::*, schema::*};

use super::m20220613_000003_create_films_table::Film;
use super::m20220613_000005_create_showrooms_table::Showroom;
use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Show::Table)
                    .col(pk_auto(Show::Id))
                    .col(date(Show::Date))
                    .col(timestamp(Show::StartTime))
                    .col(timestamp(Show::EndTime))
                    .col(double(Show::BasePrice))
                    .col(integer(Show::ShowroomId))
                    .col(integer(Show::FilmId))
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shows_showroom_id")
                            .from(Show::Table, Show::ShowroomId)
                            .to(Showroom::Table, Showroom::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shows_film_id")
                            .from(Show::Table, Show::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap checks scan a showroom's schedule by start time
        manager
            .create_index(
                Index::create()
                    .name("idx_shows_showroom_start_time")
                    .table(Show::Table)
                    .col(Show::ShowroomId)
                    .col(Show::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shows_film_id")
                    .table(Show::Table)
                    .col(Show::FilmId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Show::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Show {
    #[sea_orm(iden = "shows")]
    Table,
    Id,
    Date,
    StartTime,
    EndTime,
    BasePrice,
    ShowroomId,
    FilmId,
}
