use crate::config::get_config;
use crate::error::Result;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let statement_timeout_ms = config.db_statement_timeout_secs.saturating_mul(1000);
    let options = PgConnectOptions::from_str(&config.database_url)?
        .options([("statement_timeout", statement_timeout_ms.to_string())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect_with(options)
        .await?;
    Ok(pool)
}
