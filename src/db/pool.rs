use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Back-office traffic is bursty around shift changeovers; keep a small
/// floor of warm connections and fail fast on acquisition.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url)
        .await
}
