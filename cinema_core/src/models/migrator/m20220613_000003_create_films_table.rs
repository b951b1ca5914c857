use sea_orm_migration::{prelude::*, schema::*};

use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Film::Table)
                    .col(pk_auto(Film::Id))
                    .col(ColumnDef::new(Film::Title).string_len(64).not_null())
                    .col(text_null(Film::Description))
                    // Running time in minutes.
                    .col(integer(Film::Duration))
                    .col(ColumnDef::new(Film::Language).string_len(16).not_null())
                    .col(string(Film::Genre))
                    .col(date(Film::ReleaseDate))
                    .col(ColumnDef::new(Film::Country).string_len(64).not_null())
                    .col(created_at())
                    .col(updated_at())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Film::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Film {
    #[sea_orm(iden = "films")]
    Table,
    Id,
    Title,
    Description,
    Duration,
    Language,
    Genre,
    ReleaseDate,
    Country,
}
