use crate::models::application::{Application, ApplicationStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An application joined with its job, for the applicant's own listing.
/// Job fields are nullable-free here because the FK cascades on delete:
/// a removed listing removes the application with it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationWithJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_amount: Decimal,
    pub job_location: Option<String>,
    pub job_date: Option<chrono::NaiveDate>,
    pub job_owner_id: Uuid,
}

/// An application joined with the applicant's public profile, for the
/// job owner's applicant list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationWithApplicant {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub applicant_username: String,
    pub applicant_full_name: Option<String>,
    pub applicant_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HireResponse {
    pub application_id: Uuid,
    pub status: ApplicationStatus,
    pub rejected_siblings: u64,
    pub decided_at: DateTime<Utc>,
}
