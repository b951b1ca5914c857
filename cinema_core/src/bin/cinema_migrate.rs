use cinema_core::{config, models::migrator::Migrator};
use sea_orm_migration::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Point the CLI at the configured database unless told otherwise
    if std::env::var_os("DATABASE_URL").is_none() {
        match config::get_or_init().await {
            Ok(config) => std::env::set_var("DATABASE_URL", config.database_url()),
            Err(err) => {
                eprintln!("failed to load cinema config: {err}");
                std::process::exit(1);
            }
        }
    }

    cli::run_cli(Migrator).await;
}
