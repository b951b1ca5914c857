use std::str::FromStr;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use sqlx::sqlite::SqliteConnectOptions;

use crate::models::{self, migrator::Migrator};

/// Create a new in-memory SQLite database for testing.
/// Each call creates a fresh, isolated database instance with foreign keys enforced.
pub async fn create_test_db() -> DatabaseConnection {
    let options =
        SqliteConnectOptions::from_str("sqlite::memory:").expect("Invalid in-memory database url");

    models::connect(options)
        .await
        .expect("Failed to create test database")
}

/// Create a new in-memory SQLite database with migrations already applied.
///
/// # Example
/// ```ignore
/// #[tokio::test]
/// async fn my_test() {
///     let db = test_utils::create_test_db_with_migrations().await;
///     // Database is ready to use!
/// }
/// ```
pub async fn create_test_db_with_migrations() -> DatabaseConnection {
    let db = create_test_db().await;

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
