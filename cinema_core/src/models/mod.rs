use sea_orm::{DatabaseConnection, DbErr, SqlxSqliteConnector};
use sea_orm_migration::MigratorTrait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{config::CinemaConfig, error::CoreError};

pub mod migrator;

/// Opens (creating if needed) the SQLite database named by the config.
pub async fn open_or_create_db(config: &CinemaConfig) -> Result<DatabaseConnection, CoreError> {
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true);

    tracing::info!(path = %config.database_path.display(), "opening database");
    connect(options).await
}

/// Wraps a sqlx pool in a sea-orm connection.
///
/// Foreign keys are switched on for every connection; cascade deletes and
/// reference checks depend on it.
pub(crate) async fn connect(options: SqliteConnectOptions) -> Result<DatabaseConnection, CoreError> {
    // SQLite serializes writers anyway; one connection keeps `:memory:` databases coherent.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.foreign_keys(true))
        .await?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await?;
    tracing::info!("schema is up to date");
    Ok(())
}

pub async fn migrate_down(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::down(db, None).await?;
    tracing::info!("schema rolled back");
    Ok(())
}
