use tokio::sync::OnceCell;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    error::CoreError,
    service::{
        bookings::BookingsService, cinema::CinemaService, menu::MenuService, shows::ShowsService,
        users::UsersService,
    },
};

pub mod entity;
pub mod ids;
pub mod models;

pub mod service;

pub mod error;

pub mod config;

#[cfg(test)]
pub(crate) mod test_utils;

static CINEMA_CORE: OnceCell<Arc<CinemaCore>> = OnceCell::const_new();

/// Process-wide core, started on first use from the default config location.
pub async fn core() -> Result<Arc<CinemaCore>, CoreError> {
    CINEMA_CORE
        .get_or_try_init(|| async move { CinemaCore::start().await.map(Arc::new) })
        .await
        .cloned()
}

/// Main runtime handle for the cinema.
pub struct CinemaCore {
    pub config: config::CinemaConfig,

    pub db: DatabaseConnection,

    pub cinema: CinemaService,
    pub shows: ShowsService,
    pub bookings: BookingsService,
    pub users: UsersService,
    pub menu: MenuService,
}

impl CinemaCore {
    pub async fn start() -> Result<Self, CoreError> {
        let config = config::get_or_init().await?;
        Self::start_with(config).await
    }

    /// Open the configured database, bring the schema up to date and wire the services.
    pub async fn start_with(config: config::CinemaConfig) -> Result<Self, CoreError> {
        tracing::debug!(?config, "starting cinema core");

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let cinema = CinemaService::new(db.clone());
        let shows = ShowsService::new(db.clone(), config.seat_premiums.clone());
        let bookings = BookingsService::new(db.clone());
        let users = UsersService::new(db.clone());
        let menu = MenuService::new(db.clone(), config.max_menu_depth);

        Ok(Self {
            config,
            db,
            cinema,
            shows,
            bookings,
            users,
            menu,
        })
    }

    pub async fn shutdown(self) -> Result<(), CoreError> {
        self.db.close().await?;
        tracing::info!("cinema core stopped");
        Ok(())
    }
}

pub mod prelude {
    pub use super::ids;
    pub use super::entity;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;

    pub use super::{core, CinemaCore};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::cinema::tests::sample_layout;

    #[tokio::test]
    async fn test_start_and_reopen() {
        let dir = std::env::temp_dir().join(format!("cinema_core_start_{}", uuid::Uuid::now_v7()));
        let config = config::get_or_init_in(&dir).await.unwrap();

        let core = CinemaCore::start_with(config.clone()).await.unwrap();
        let roxy = core
            .cinema
            .create_cinema("Roxy".to_string(), "1 Main St".to_string(), "555".to_string())
            .await
            .unwrap();
        core.cinema
            .add_showroom(roxy.id, "Hall 1".to_string(), &sample_layout())
            .await
            .unwrap();
        core.shutdown().await.unwrap();

        // Data and schema survive a restart
        let core = CinemaCore::start_with(config).await.unwrap();
        let cinema = core.cinema.get_cinema().await.unwrap();
        assert_eq!(cinema.total_showrooms, 1);
        core.shutdown().await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
