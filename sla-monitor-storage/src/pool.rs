use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::Result;

/// Connects to Postgres with a bounded pool and runs pending migrations.
/// Called once at startup; the returned pool is the one shared mutable
/// resource threaded through the rest of the process.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
