use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::time::Duration;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 2;

/// Connects to Postgres using DATABASE_URL, with pool sizing overridable
/// through DB_MAX_CONNECTIONS / DB_MIN_CONNECTIONS.
pub async fn get_database() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(env_u32("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS))
        .min_connections(env_u32("DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS))
        .connect_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    Database::connect(opt).await
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
