use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `discovered_jobs` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discovered_jobs (
            job_id        TEXT NOT NULL,
            user_id       TEXT NOT NULL,
            title         TEXT NOT NULL,
            company       TEXT NOT NULL,
            location      TEXT NOT NULL,
            description   TEXT NOT NULL,
            requirements  TEXT[] NOT NULL DEFAULT '{}',
            salary_range  TEXT,
            job_type      TEXT NOT NULL,
            source_url    TEXT NOT NULL,
            source        TEXT NOT NULL,
            source_id     TEXT NOT NULL DEFAULT '',
            posted_date   TIMESTAMPTZ NOT NULL,
            scraped_at    TIMESTAMPTZ NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (job_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create discovered_jobs table")?;

    // Tables created before records carried their adapter id.
    sqlx::query(
        "ALTER TABLE discovered_jobs ADD COLUMN IF NOT EXISTS source_id TEXT NOT NULL DEFAULT ''",
    )
    .execute(pool)
    .await
    .context("Failed to add discovered_jobs.source_id")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS discovered_jobs_user_scraped_idx ON discovered_jobs (user_id, scraped_at DESC)",
    )
    .execute(pool)
    .await
    .context("Failed to create discovered_jobs index")?;

    info!("discovered_jobs schema ready");
    Ok(())
}
