use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connects lazily: a configured-but-unreachable primary must surface at
/// call time (where the store falls back), not as a startup failure.
pub fn init_db(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)
        .map_err(|e| anyhow::anyhow!("Postgres configuration invalid (check DATABASE_URL): {e}"))?;

    Ok(pool)
}
