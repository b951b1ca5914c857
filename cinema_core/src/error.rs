use thiserror::Error;

/// Errors raised while bringing the core up: config, database, schema.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,

    #[error("config io error")]
    Io(#[from] std::io::Error),

    #[error("malformed config file")]
    Config(#[from] serde_json::Error),

    #[error("data store disconnected")]
    AquireError(#[from] sqlx::Error),

    #[error("fatal database error")]
    DbError(#[from] sea_orm::DbErr),
}
