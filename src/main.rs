// src/main.rs
use std::env;
use dotenvy::dotenv;
use debt_tracker::config::{log_warnings, AppConfig};
use debt_tracker::{backend, cli, database, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let (config, warnings) = AppConfig::from_env();

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "server" {
        logging::init_tracing(config.log_json);
        log_warnings(&warnings);
        tracing::info!("starting backend server");

        let pool = database::db::connection::get_db_pool(&config).await?;
        database::db::migrate::run_migrations(&pool).await?;
        backend::run_server(pool, config.bind_addr).await?;
    } else {
        logging::init_file_tracing(config.log_file.as_deref())?;
        log_warnings(&warnings);
        cli::run(&config).await?;
    }
    Ok(())
}
