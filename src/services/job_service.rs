use crate::dto::feed_dto::FeedJob;
use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result, WorkflowError};
use crate::models::job::Job;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        if payload.amount < Decimal::ZERO {
            return Err(Error::BadRequest("Pay amount cannot be negative".to_string()));
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                owner_id, title, amount, location, latitude, longitude,
                job_date, shift_start, shift_end, has_food, dress_code
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&payload.title)
        .bind(payload.amount)
        .bind(&payload.location)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.job_date)
        .bind(&payload.shift_start)
        .bind(&payload.shift_end)
        .bind(payload.has_food)
        .bind(&payload.dress_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn update(&self, id: Uuid, actor_id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let existing = self.get_by_id(id).await?;
        if existing.owner_id != actor_id {
            return Err(WorkflowError::NotOwner.into());
        }
        if let Some(amount) = payload.amount {
            if amount < Decimal::ZERO {
                return Err(Error::BadRequest("Pay amount cannot be negative".to_string()));
            }
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                amount = COALESCE($3, amount),
                location = COALESCE($4, location),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                job_date = COALESCE($7, job_date),
                shift_start = COALESCE($8, shift_start),
                shift_end = COALESCE($9, shift_end),
                has_food = COALESCE($10, has_food),
                dress_code = COALESCE($11, dress_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(payload.amount)
        .bind(&payload.location)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.job_date)
        .bind(&payload.shift_start)
        .bind(&payload.shift_end)
        .bind(payload.has_food)
        .bind(&payload.dress_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        job.ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    pub async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"SELECT * FROM jobs WHERE owner_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// Candidate rows for the feed: every OPEN job except the
    /// requester's own, with the poster's public profile joined in.
    /// Distance annotation and filtering happen downstream.
    pub async fn open_jobs_excluding(&self, requester_id: Uuid, limit: i64) -> Result<Vec<FeedJob>> {
        let rows = sqlx::query_as::<_, FeedJob>(
            r#"
            SELECT j.*,
                   p.username AS poster_username,
                   p.full_name AS poster_full_name,
                   p.avatar_url AS poster_avatar_url
            FROM jobs j
            JOIN profiles p ON p.id = j.owner_id
            WHERE j.status = 'OPEN' AND j.owner_id <> $1
            ORDER BY j.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(requester_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Owner-only delete; applications go with the job via the FK cascade.
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<()> {
        let existing = self.get_by_id(id).await?;
        if existing.owner_id != actor_id {
            return Err(WorkflowError::NotOwner.into());
        }

        sqlx::query(r#"DELETE FROM jobs WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
