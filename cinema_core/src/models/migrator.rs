use sea_orm_migration::prelude::*;

mod m20220613_000001_create_roles_table;
mod m20220613_000002_create_users_table;
mod m20220613_000003_create_films_table;
mod m20220613_000004_create_cinema_table;
mod m20220613_000005_create_showrooms_table;
mod m20220613_000006_create_showroom_seat_table;
mod m20220613_000007_create_shows_table;
mod m20220613_000008_create_bookings_table;
mod m20220613_000009_create_show_seat_table;
mod m20220613_000010_create_payments_table;
mod m20220613_000011_create_tickets_table;
mod m20220613_000012_create_menu_items_table;

/// Every table created by [`Migrator`], in creation order.
pub const TABLES: [&str; 12] = [
    "roles",
    "users",
    "films",
    "cinema",
    "showrooms",
    "showroom_seat",
    "shows",
    "bookings",
    "show_seat",
    "payments",
    "tickets",
    "menu_items",
];

pub struct Migrator;

// Rollback runs these in reverse, so each table is dropped before the ones it references.
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220613_000001_create_roles_table::Migration),
            Box::new(m20220613_000002_create_users_table::Migration),
            Box::new(m20220613_000003_create_films_table::Migration),
            Box::new(m20220613_000004_create_cinema_table::Migration),
            Box::new(m20220613_000005_create_showrooms_table::Migration),
            Box::new(m20220613_000006_create_showroom_seat_table::Migration),
            Box::new(m20220613_000007_create_shows_table::Migration),
            Box::new(m20220613_000008_create_bookings_table::Migration),
            Box::new(m20220613_000009_create_show_seat_table::Migration),
            Box::new(m20220613_000010_create_payments_table::Migration),
            Box::new(m20220613_000011_create_tickets_table::Migration),
            Box::new(m20220613_000012_create_menu_items_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Timestamps {
    CreatedAt,
    UpdatedAt,
}

fn created_at() -> ColumnDef {
    ColumnDef::new(Timestamps::CreatedAt)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn updated_at() -> ColumnDef {
    ColumnDef::new(Timestamps::UpdatedAt)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}
