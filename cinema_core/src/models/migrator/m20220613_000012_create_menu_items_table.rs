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
                    .table(MenuItem::Table)
                    .col(pk_auto(MenuItem::Id))
                    .col(string(MenuItem::Title))
                    .col(ColumnDef::new(MenuItem::Position).integer().not_null().default(0))
                    .col(integer_null(MenuItem::ParentId)) // NULL for roots
                    .col(created_at())
                    .col(updated_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_items_parent_id")
                            .from(MenuItem::Table, MenuItem::ParentId)
                            .to(MenuItem::Table, MenuItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Children are fetched a level at a time by parent_id
        manager
            .create_index(
                Index::create()
                    .name("idx_menu_items_parent_id")
                    .table(MenuItem::Table)
                    .col(MenuItem::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MenuItem {
    #[sea_orm(iden = "menu_items")]
    Table,
    Id,
    Title,
    Position,
    ParentId,
}
