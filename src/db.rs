//! Database pool construction, migrations, and default-data seeding.

use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;

/// Builds the shared connection pool from startup configuration.
/// Pool exhaustion shows up as acquire timeouts, never as corrupted state.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Liveness probe used by the `/health` endpoint.
pub async fn check_connection(pool: &PgPool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|v| v == 1)
        .unwrap_or(false)
}

/// The shared default priorities every account can reference.
pub const DEFAULT_PRIORITIES: [(&str, i32, &str); 4] = [
    ("Low", 1, "#90EE90"),
    ("Medium", 2, "#FFD700"),
    ("High", 3, "#FF6347"),
    ("Urgent", 4, "#DC143C"),
];

/// Inserts the shared default priorities if none exist yet. Idempotent, so
/// it is safe to run on every startup.
pub async fn seed_default_priorities(pool: &PgPool) -> Result<(), sqlx::Error> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM priorities WHERE user_id IS NULL")
            .fetch_one(pool)
            .await?;

    if existing > 0 {
        log::info!("found {} shared priorities, skipping seed", existing);
        return Ok(());
    }

    let now = Utc::now();
    for (name, value, color) in DEFAULT_PRIORITIES {
        sqlx::query(
            "INSERT INTO priorities (id, user_id, name, value, color, created_at, updated_at)
             VALUES ($1, NULL, $2, $3, $4, $5, $5)
             ON CONFLICT DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(value)
        .bind(color)
        .bind(now)
        .execute(pool)
        .await?;
    }

    log::info!("seeded {} default priorities", DEFAULT_PRIORITIES.len());
    Ok(())
}
