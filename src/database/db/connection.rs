use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::config::AppConfig;

pub async fn get_db_pool(config: &AppConfig) -> Result<Pool<Sqlite>, sqlx::Error> {
    connect(&config.database_url, config.max_connections).await
}

pub async fn connect(db_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// In-memory database kept on a single connection that is never recycled,
/// since every new connection to `:memory:` starts empty.
pub async fn memory_pool() -> Result<Pool<Sqlite>, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}
