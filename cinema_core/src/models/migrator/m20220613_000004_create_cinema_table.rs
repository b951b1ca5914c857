use sea_orm_migration::{prelude::*, schema::*, sea_orm::ConnectionTrait};

use super::{created_at, updated_at};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cinema::Table)
                    .col(pk_auto(Cinema::Id))
                    .col(ColumnDef::new(Cinema::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Cinema::TotalShowrooms)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string(Cinema::Address))
                    .col(string(Cinema::Phone))
                    .col(created_at())
                    .col(updated_at())
                    .to_owned(),
            )
            .await?;

        // The indexed expression is 1 for every row, so a second cinema is a unique violation
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_cinema_single ON cinema ((name IS NOT NULL))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cinema::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Cinema {
    Table,
    Id,
    Name,
    TotalShowrooms,
    Address,
    Phone,
}
