use crate::dto::application_dto::{ApplicationWithApplicant, ApplicationWithJob, HireResponse};
use crate::error::{Error, HireStep, Result, WorkflowError};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{Job, JobStatus};
use crate::services::notification_service::{DomainEvent, NotificationService};
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Drives the application lifecycle. The hire transition runs three
/// effects against the store in a fixed order, each one an idempotent
/// conditional UPDATE, so a retry after any partial failure converges
/// to the same terminal state instead of relying on multi-statement
/// atomicity the store does not offer.
#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    hires_in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

enum HireOutcome {
    /// A PENDING application about to be decided.
    FreshDecision,
    /// The target is already ACCEPTED; re-drive the remaining steps
    /// and report success.
    Retry,
}

fn apply_guards(job: &Job, applicant_id: Uuid, existing: Option<&Application>) -> Result<()> {
    if existing.is_some() {
        return Err(WorkflowError::DuplicateApplication.into());
    }
    if applicant_id == job.owner_id {
        return Err(WorkflowError::InvalidApplicant.into());
    }
    if job.status != JobStatus::Open {
        return Err(WorkflowError::JobClosed.into());
    }
    Ok(())
}

fn hire_guards(job: &Job, application: &Application, actor_id: Uuid) -> Result<HireOutcome> {
    if actor_id != job.owner_id {
        return Err(WorkflowError::NotOwner.into());
    }
    match application.status {
        ApplicationStatus::Accepted => Ok(HireOutcome::Retry),
        ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => {
            Err(WorkflowError::AlreadyDecided.into())
        }
        ApplicationStatus::Pending => {
            if job.status != JobStatus::Open {
                return Err(WorkflowError::JobClosed.into());
            }
            Ok(HireOutcome::FreshDecision)
        }
    }
}

fn withdraw_guards(application: &Application, actor_id: Uuid) -> Result<()> {
    if actor_id != application.applicant_id {
        return Err(WorkflowError::NotApplicant.into());
    }
    if application.status != ApplicationStatus::Pending {
        return Err(WorkflowError::AlreadyDecided.into());
    }
    Ok(())
}

/// Removes the application from the in-flight set when the hire call
/// settles, success or failure.
struct HireGate {
    set: Arc<Mutex<HashSet<Uuid>>>,
    application_id: Uuid,
}

impl Drop for HireGate {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("hire gate mutex poisoned")
            .remove(&self.application_id);
    }
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hires_in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub async fn apply(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        notifications: &NotificationService,
    ) -> Result<Application> {
        let job = self.fetch_job(job_id).await?;

        let existing = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE job_id = $1 AND applicant_id = $2"#,
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?;

        apply_guards(&job, applicant_id, existing.as_ref())?;

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (job_id, applicant_id, status)
            VALUES ($1, $2, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Unique (job_id, applicant_id) backstops the guard when two
            // applies race.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Workflow(WorkflowError::DuplicateApplication)
            }
            _ => Error::from(e),
        })?;

        let event = DomainEvent::ApplicationReceived {
            owner_id: job.owner_id,
            applicant_name: self.username_of(applicant_id).await,
            job_id: job.id,
            job_title: job.title.clone(),
        };
        if let Err(e) = notifications.record(job.owner_id, &event).await {
            tracing::warn!(job_id = %job_id, error = ?e, "Failed to record apply notification");
        }

        Ok(application)
    }

    /// Accept one application and settle the whole job: the target goes
    /// ACCEPTED, sibling PENDING applications go REJECTED, the job
    /// leaves OPEN with the winner recorded. Steps run in that fixed
    /// order; a failure names the step (`HireInterrupted`) and the call
    /// may simply be retried. Re-hiring an already-ACCEPTED application
    /// is success, not an error.
    pub async fn hire(
        &self,
        application_id: Uuid,
        actor_id: Uuid,
        notifications: &NotificationService,
    ) -> Result<HireResponse> {
        let _gate = self.enter_hire_gate(application_id)?;

        let application = self.fetch_application(application_id).await?;
        let job = self.fetch_job(application.job_id).await?;
        let outcome = hire_guards(&job, &application, actor_id)?;

        // Step 1: accept the target.
        let accepted = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'ACCEPTED', updated_at = NOW()
            WHERE id = $1 AND status IN ('PENDING', 'ACCEPTED')
            "#,
        )
        .bind(application_id)
        .execute(&self.pool)
        .await
        .map_err(|source| Error::HireInterrupted {
            step: HireStep::AcceptApplication,
            source,
        })?;

        if accepted.rows_affected() == 0 {
            // The application was decided between the guard read and the
            // write (a concurrent withdraw, or a racing decision).
            return Err(WorkflowError::AlreadyDecided.into());
        }

        // Step 2: reject the losing siblings.
        let rejected = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'REJECTED', updated_at = NOW()
            WHERE job_id = $1 AND id <> $2 AND status = 'PENDING'
            "#,
        )
        .bind(application.job_id)
        .bind(application_id)
        .execute(&self.pool)
        .await
        .map_err(|source| Error::HireInterrupted {
            step: HireStep::RejectSiblings,
            source,
        })?;

        // Step 3: take the job off the feed and record the hire.
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'ACCEPTED', hired_applicant_id = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('OPEN', 'ACCEPTED')
            "#,
        )
        .bind(application.job_id)
        .bind(application.applicant_id)
        .execute(&self.pool)
        .await
        .map_err(|source| Error::HireInterrupted {
            step: HireStep::CloseJob,
            source,
        })?;

        if matches!(outcome, HireOutcome::FreshDecision) {
            let event = DomainEvent::ApplicationAccepted {
                applicant_id: application.applicant_id,
                job_id: job.id,
                job_title: job.title.clone(),
            };
            if let Err(e) = notifications.record(application.applicant_id, &event).await {
                tracing::warn!(application_id = %application_id, error = ?e, "Failed to record hire notification");
            }
        }

        tracing::info!(
            application_id = %application_id,
            job_id = %application.job_id,
            rejected_siblings = rejected.rows_affected(),
            "Hire settled"
        );

        Ok(HireResponse {
            application_id,
            status: ApplicationStatus::Accepted,
            rejected_siblings: rejected.rows_affected(),
            decided_at: Utc::now(),
        })
    }

    pub async fn withdraw(&self, application_id: Uuid, actor_id: Uuid) -> Result<Application> {
        let application = self.fetch_application(application_id).await?;
        withdraw_guards(&application, actor_id)?;

        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'WITHDRAWN', updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| WorkflowError::AlreadyDecided.into())
    }

    pub async fn list_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<ApplicationWithJob>> {
        let rows = sqlx::query_as::<_, ApplicationWithJob>(
            r#"
            SELECT a.*,
                   j.title AS job_title,
                   j.amount AS job_amount,
                   j.location AS job_location,
                   j.job_date AS job_date,
                   j.owner_id AS job_owner_id
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.applicant_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The applicant list for a job; owner-only.
    pub async fn list_for_job(
        &self,
        job_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>> {
        let job = self.fetch_job(job_id).await?;
        if actor_id != job.owner_id {
            return Err(WorkflowError::NotOwner.into());
        }

        let rows = sqlx::query_as::<_, ApplicationWithApplicant>(
            r#"
            SELECT a.*,
                   p.username AS applicant_username,
                   p.full_name AS applicant_full_name,
                   p.avatar_url AS applicant_avatar_url
            FROM applications a
            JOIN profiles p ON p.id = a.applicant_id
            WHERE a.job_id = $1
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Second concurrent hire on the same application is refused while
    /// the first is still settling; the gate lifts when that call
    /// returns, after which a retry goes through the idempotent path.
    fn enter_hire_gate(&self, application_id: Uuid) -> Result<HireGate> {
        let mut in_flight = self
            .hires_in_flight
            .lock()
            .expect("hire gate mutex poisoned");
        if !in_flight.insert(application_id) {
            return Err(Error::Conflict(
                "A hire for this application is already in progress".to_string(),
            ));
        }
        Ok(HireGate {
            set: Arc::clone(&self.hires_in_flight),
            application_id,
        })
    }

    async fn fetch_application(&self, id: Uuid) -> Result<Application> {
        let row = sqlx::query_as::<_, Application>(r#"SELECT * FROM applications WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    async fn fetch_job(&self, id: Uuid) -> Result<Job> {
        let row = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    async fn username_of(&self, user_id: Uuid) -> Option<String> {
        sqlx::query_scalar::<_, String>(r#"SELECT username FROM profiles WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
    }
}
