use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{entity::SeatType, error::CoreError};

static DATA_DIR_NAME: &str = "cinema_next";
static CINEMA_DB_NAME: &str = "cinema_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// For now this directory structure should be like
// data_dir_path
// |- cinema_next
//    |- cinema_db.sqlite
//    |- config.json

fn default_max_menu_depth() -> usize {
    16
}

/// Percentage added on top of a show's base price, per seat type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SeatPremiums {
    pub standard: f64,
    pub vip: f64,
    pub couple: f64,
    pub super_vip: f64,
}

impl Default for SeatPremiums {
    fn default() -> Self {
        Self {
            standard: 0.0,
            vip: 50.0,
            couple: 100.0,
            super_vip: 150.0,
        }
    }
}

impl SeatPremiums {
    pub fn percent_for(&self, seat_type: SeatType) -> f64 {
        match seat_type {
            SeatType::Standard => self.standard,
            SeatType::Vip => self.vip,
            SeatType::Couple => self.couple,
            SeatType::SuperVip => self.super_vip,
        }
    }

    /// Price of a seat of `seat_type` for a show priced at `base_price`, rounded to cents.
    pub fn price_for(&self, seat_type: SeatType, base_price: f64) -> f64 {
        let price = base_price * (1.0 + self.percent_for(seat_type) / 100.0);
        (price * 100.0).round() / 100.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CinemaConfig {
    pub(crate) database_path: PathBuf,

    /// Depth bound used when a caller doesn't pass one to menu traversal.
    ///
    /// `serde(default)` keeps backward compatibility with old config.json files.
    #[serde(default = "default_max_menu_depth")]
    pub max_menu_depth: usize,

    #[serde(default)]
    pub seat_premiums: SeatPremiums,
}

impl CinemaConfig {
    /// Creates a new CinemaConfig with its database inside the specified data directory
    pub fn new(data_dir: &Path) -> Self {
        CinemaConfig {
            database_path: data_dir.join(CINEMA_DB_NAME),
            max_menu_depth: default_max_menu_depth(),
            seat_premiums: SeatPremiums::default(),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn database_url(&self) -> String {
        // Use display() to convert PathBuf to string representation
        format!("sqlite://{}?mode=rwc", self.database_path.display())
    }
}

/// Gets the existing config or initializes a new one in the platform data directory
pub async fn get_or_init() -> Result<CinemaConfig, CoreError> {
    let data_dir = dirs::data_dir().ok_or(CoreError::NoDataDir)?;
    get_or_init_in(&data_dir.join(DATA_DIR_NAME)).await
}

/// Same as [`get_or_init`], rooted at an explicit directory.
pub async fn get_or_init_in(cinema_dir: &Path) -> Result<CinemaConfig, CoreError> {
    let config_path = cinema_dir.join(CONFIG_FILE_NAME);

    // Create the cinema directory if it doesn't exist
    fs::create_dir_all(cinema_dir).await?;

    if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: CinemaConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    } else {
        let config = CinemaConfig::new(cinema_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        tracing::info!(path = %config_path.display(), "wrote default config");
        Ok(config)
    }
}
