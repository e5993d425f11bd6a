//! Persistence of discovered jobs per user.
//!
//! Rows are keyed by `(job_id, user_id)`. Writes are insert-only: a job that
//! is already stored for the user is left untouched.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::job::{DiscoveredJobRow, JobRecord};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Stores `jobs` for `user_id` and returns how many were new.
    async fn upsert_jobs(&self, user_id: &str, jobs: &[JobRecord]) -> Result<u64>;

    /// Most recently scraped jobs first. `source` matches either the adapter id
    /// (`careerpages`) or the record's display name (`GitLab Careers`).
    async fn list_jobs(
        &self,
        user_id: &str,
        source: Option<&str>,
        limit: i64,
    ) -> Result<Vec<JobRecord>>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn upsert_jobs(&self, user_id: &str, jobs: &[JobRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for job in jobs {
            let result = sqlx::query(
                r#"
                INSERT INTO discovered_jobs
                    (job_id, user_id, title, company, location, description, requirements,
                     salary_range, job_type, source_url, source, source_id, posted_date,
                     scraped_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                ON CONFLICT (job_id, user_id) DO NOTHING
                "#,
            )
            .bind(&job.job_id)
            .bind(user_id)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.salary_range)
            .bind(job.job_type.as_str())
            .bind(&job.source_url)
            .bind(&job.source)
            .bind(&job.source_id)
            .bind(job.posted_date)
            .bind(job.scraped_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        info!("Stored {inserted} of {} discovered jobs for user {user_id}", jobs.len());
        Ok(inserted)
    }

    async fn list_jobs(
        &self,
        user_id: &str,
        source: Option<&str>,
        limit: i64,
    ) -> Result<Vec<JobRecord>> {
        let rows = sqlx::query_as::<_, DiscoveredJobRow>(
            r#"
            SELECT job_id, title, company, location, description, requirements,
                   salary_range, job_type, source_url, source, source_id, posted_date,
                   scraped_at
            FROM discovered_jobs
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR source_id = $2 OR source = $2)
            ORDER BY scraped_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(source)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DiscoveredJobRow::into_record).collect())
    }
}

/// Process-local store for tests and database-less runs.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryJobStore {
    rows: Mutex<Vec<(String, JobRecord)>>,
}

#[allow(dead_code)]
impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn upsert_jobs(&self, user_id: &str, jobs: &[JobRecord]) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let mut inserted = 0;
        for job in jobs {
            let exists = rows
                .iter()
                .any(|(user, stored)| user == user_id && stored.job_id == job.job_id);
            if !exists {
                rows.push((user_id.to_string(), job.clone()));
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_jobs(
        &self,
        user_id: &str,
        source: Option<&str>,
        limit: i64,
    ) -> Result<Vec<JobRecord>> {
        let rows = self.rows.lock().await;
        let mut jobs: Vec<JobRecord> = rows
            .iter()
            .filter(|(user, job)| {
                user == user_id
                    && source.map_or(true, |s| job.source_id == s || job.source == s)
            })
            .map(|(_, job)| job.clone())
            .collect();
        jobs.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at));
        jobs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(jobs)
    }
}
